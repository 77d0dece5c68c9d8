//! Code generation for `routine!`.

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use syn::{Ident, Path, Visibility};

use crate::parsing::{Body, Declaration, Implementation, NumberingKind, RoutineItem, RoutineItems};
use crate::validation::{
    resume_points, validate_declaration_options, validate_frame_options,
    validate_implementation_options,
};

/// Expand a whole `routine! { ... }` invocation.
pub(crate) fn expand(input: TokenStream) -> syn::Result<TokenStream> {
    let RoutineItems(items) = syn::parse2(input)?;

    let mut output = TokenStream::new();
    for item in items {
        let tokens = match item {
            RoutineItem::Define(declaration, body) => {
                validate_frame_options(&declaration)?;
                let numbering = declaration
                    .options
                    .numbering
                    .map(|(kind, _)| kind)
                    .unwrap_or(NumberingKind::Automatic);
                let path: Path = declaration.name.clone().into();
                let frame_ty = frame_type(&declaration);
                let routine_impl =
                    generate_routine_impl(&path, &declaration.name, &frame_ty, numbering, &body)?;
                let declared = generate_declaration(&declaration);
                quote! {
                    #declared
                    #routine_impl
                }
            }
            RoutineItem::Declare(declaration) => {
                validate_declaration_options(&declaration.options)?;
                validate_frame_options(&declaration)?;
                generate_declaration(&declaration)
            }
            RoutineItem::Implement(implementation) => generate_implementation(implementation)?,
        };
        output.extend(tokens);
    }
    Ok(output)
}

fn frame_ident(name: &Ident) -> Ident {
    format_ident!("{}Frame", name)
}

fn frame_type(declaration: &Declaration) -> TokenStream {
    if declaration.fields.is_some() {
        let frame = frame_ident(&declaration.name);
        quote! { #frame }
    } else {
        quote! { () }
    }
}

/// Marker type, frame record and the inherent `init` / `run` helpers.
fn generate_declaration(declaration: &Declaration) -> TokenStream {
    let Declaration {
        options,
        vis,
        name,
        fields,
    } = declaration;
    let attrs = &options.attrs;

    let marker = quote! {
        #(#attrs)*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        #vis struct #name;
    };

    let Some(fields) = fields else {
        return quote! {
            #marker

            impl #name {
                /// Fresh instance, cursor at start.
                #vis fn init() -> ::stepwise_runtime::Instance<Self> {
                    ::stepwise_runtime::Instance::frameless()
                }

                /// Resume with a separately stored cursor.
                #vis fn run(
                    cursor: &mut ::stepwise_runtime::RoutineCursor,
                ) -> ::stepwise_runtime::Step {
                    ::stepwise_runtime::resume_frameless::<Self>(cursor)
                }
            }
        };
    };

    let frame = frame_ident(name);
    let frame_attrs = &options.frame_attrs;
    let frame_doc = format!("Persistent frame of [`{}`].", name);

    let field_defs = fields.iter().map(|field| {
        let mut field = field.clone();
        if matches!(field.vis, Visibility::Inherited) {
            field.vis = vis.clone();
        }
        field
    });
    let field_names: Vec<_> = fields.iter().map(|f| &f.ident).collect();
    let field_types: Vec<_> = fields.iter().map(|f| &f.ty).collect();

    quote! {
        #marker

        #[doc = #frame_doc]
        #(#[#frame_attrs])*
        #vis struct #frame {
            #(#field_defs,)*
        }

        impl #name {
            /// Fresh instance with the given frame values, cursor at start.
            #[allow(clippy::too_many_arguments)]
            #vis fn init(#(#field_names: #field_types),*) -> ::stepwise_runtime::Instance<Self> {
                ::stepwise_runtime::Instance::new(#frame { #(#field_names),* })
            }

            /// Resume with a separately stored cursor and frame.
            #vis fn run(
                cursor: &mut ::stepwise_runtime::RoutineCursor,
                frame: &mut #frame,
            ) -> ::stepwise_runtime::Step {
                ::stepwise_runtime::resume::<Self>(cursor, frame)
            }
        }
    }
}

/// `impl path::Name |frame| { ... }`: the frame type sits next to the marker.
fn generate_implementation(implementation: Implementation) -> syn::Result<TokenStream> {
    let Implementation {
        options,
        path,
        body,
    } = implementation;
    validate_implementation_options(&options)?;

    let name = match path.segments.last() {
        Some(segment) => segment.ident.clone(),
        None => return Err(syn::Error::new_spanned(&path, "expected a routine path")),
    };

    let frame_ty = if body.binding.is_some() {
        let mut frame_path = path.clone();
        if let Some(last) = frame_path.segments.last_mut() {
            last.ident = frame_ident(&name);
        }
        quote! { #frame_path }
    } else {
        quote! { () }
    };

    let numbering = options
        .numbering
        .map(|(kind, _)| kind)
        .unwrap_or(NumberingKind::Automatic);
    let routine_impl = generate_routine_impl(&path, &name, &frame_ty, numbering, &body)?;

    let attrs = &options.attrs;
    Ok(quote! {
        #(#attrs)*
        const _: () = {
            #routine_impl
        };
    })
}

/// The `Routine` impl: resume-point table and jump dispatch.
fn generate_routine_impl(
    path: &Path,
    name: &Ident,
    frame_ty: &TokenStream,
    numbering: NumberingKind,
    body: &Body,
) -> syn::Result<TokenStream> {
    let points = resume_points(numbering, body)?;
    let point_literals: Vec<_> = points.iter().map(|&p| Literal::u64_suffixed(p)).collect();
    let variants: Vec<_> = (0..points.len())
        .map(|index| format_ident!("Segment{}", index))
        .collect();

    let name_str = name.to_string();
    let numbering_variant = match numbering {
        NumberingKind::Automatic => quote! { Automatic },
        NumberingKind::Manual => quote! { Manual },
    };

    let binding = match &body.binding {
        Some(ident) => quote! { #ident },
        None => quote! { _ },
    };

    let arms = body.segments.iter().enumerate().map(|(index, segment)| {
        let variant = &variants[index];
        let stmts = &segment.stmts;

        let terminator = match &segment.directive {
            None => quote! {
                __stepwise_cursor.complete();
            },
            Some(directive) => {
                let next = &point_literals[index + 1];
                let hold = directive.until.as_ref().map(|condition| {
                    quote! {
                        if !(#condition) {
                            return;
                        }
                    }
                });
                quote! {
                    #hold
                    ::stepwise_runtime::__private::advance(__stepwise_cursor, #next);
                }
            }
        };

        quote! {
            __ResumePoint::#variant => {
                #(#stmts)*
                #terminator
            }
        }
    });

    Ok(quote! {
        impl ::stepwise_runtime::Routine for #path {
            type Frame = #frame_ty;
            const NAME: &'static str = #name_str;
            const NUMBERING: ::stepwise_runtime::Numbering =
                ::stepwise_runtime::Numbering::#numbering_variant;
            const RESUME_POINTS: &'static [::stepwise_runtime::CursorValue] =
                &[#(#point_literals),*];

            #[allow(
                unused_variables,
                unused_mut,
                unreachable_code,
                clippy::needless_return,
                clippy::diverging_sub_expression
            )]
            fn dispatch(
                __stepwise_cursor: &mut ::stepwise_runtime::RoutineCursor,
                #binding: &mut #frame_ty,
            ) {
                #[allow(unused_macros)]
                macro_rules! exit {
                    () => {{
                        __stepwise_cursor.complete();
                        return;
                    }};
                }

                enum __ResumePoint {
                    #(#variants,)*
                }

                let __stepwise_point = match __stepwise_cursor.get() {
                    #(#point_literals => __ResumePoint::#variants,)*
                    _ => {
                        ::stepwise_runtime::__private::unknown_point(__stepwise_cursor);
                        return;
                    }
                };

                match __stepwise_point {
                    #(#arms)*
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(input: TokenStream) -> String {
        expand(input).unwrap().to_string()
    }

    fn expand_err(input: TokenStream) -> String {
        expand(input).err().unwrap().to_string()
    }

    #[test]
    fn test_define_generates_marker_frame_and_impl() {
        let out = expand_str(quote! {
            pub Ticker { ticks: u32 } |frame| {
                frame.ticks += 1;
                yield;
                frame.ticks += 1;
            }
        });
        assert!(out.contains("pub struct Ticker"));
        assert!(out.contains("pub struct TickerFrame"));
        assert!(out.contains("pub ticks : u32"));
        assert!(out.contains("impl :: stepwise_runtime :: Routine for Ticker"));
        assert!(out.contains("Segment0"));
        assert!(out.contains("Segment1"));
        assert!(!out.contains("Segment2"));
        assert!(out.contains("& [0u64 , 1u64]"));
    }

    #[test]
    fn test_frameless_uses_unit_frame() {
        let out = expand_str(quote! {
            Idle || { yield; }
        });
        assert!(out.contains("type Frame = ()"));
        assert!(out.contains("resume_frameless"));
        assert!(!out.contains("IdleFrame"));
    }

    #[test]
    fn test_manual_numbering_table() {
        let out = expand_str(quote! {
            #[numbering(manual)]
            Manual || { yield 0; yield 1 until ready(); }
        });
        assert!(out.contains("Numbering :: Manual"));
        assert!(out.contains("& [0u64 , 1u64 , 2u64]"));
    }

    #[test]
    fn test_conditional_suspend_holds() {
        let out = expand_str(quote! {
            Wait { n: u8 } |f| { yield until f.n == 0; }
        });
        assert!(out.contains("if ! (f . n == 0)"));
    }

    #[test]
    fn test_frame_attributes_applied() {
        let out = expand_str(quote! {
            #[frame(derive(Debug, Clone))]
            Traced { n: u8 } |f| { f.n += 1; }
        });
        assert!(out.contains("# [derive (Debug , Clone)] pub struct TracedFrame")
            || out.contains("# [derive (Debug , Clone)] struct TracedFrame"));
    }

    #[test]
    fn test_declaration_only() {
        let out = expand_str(quote! {
            pub Split { a: i32 };
        });
        assert!(out.contains("pub struct SplitFrame"));
        assert!(!out.contains("Routine for"));
    }

    #[test]
    fn test_implementation_derives_frame_path() {
        let out = expand_str(quote! {
            impl crate::api::Split |frame| { frame.a += 1; }
        });
        assert!(out.contains("Routine for crate :: api :: Split"));
        assert!(out.contains("type Frame = crate :: api :: SplitFrame"));
        assert!(out.contains("const NAME : & 'static str = \"Split\""));
    }

    #[test]
    fn test_multiple_routines_in_one_invocation() {
        let out = expand_str(quote! {
            First || { yield; }
            Second || { yield; }
        });
        assert!(out.contains("struct First"));
        assert!(out.contains("struct Second"));
    }

    #[test]
    fn test_numbering_on_declaration_rejected() {
        let err = expand_err(quote! {
            #[numbering(manual)]
            Split { a: i32 };
        });
        assert!(err.contains("declaration has no suspension points"));
    }

    #[test]
    fn test_frame_on_implementation_rejected() {
        let err = expand_err(quote! {
            #[frame(derive(Debug))]
            impl Split |frame| { }
        });
        assert!(err.contains("`#[frame]` belongs on the routine declaration"));
    }

    #[test]
    fn test_frame_on_frameless_routine_rejected() {
        let err = expand_err(quote! {
            #[frame(derive(Debug))]
            Bare || { yield; }
        });
        assert!(err.contains("`#[frame]` has nothing to apply to"));

        let err = expand_err(quote! {
            #[frame(derive(Debug))]
            pub Bare;
        });
        assert!(err.contains("no frame fields"));
    }

    #[test]
    fn test_unknown_numbering_rejected() {
        let err = expand_err(quote! {
            #[numbering(sometimes)]
            Odd || { }
        });
        assert!(err.contains("expected"));
    }

    #[test]
    fn test_binding_mismatch_rejected() {
        let err = expand_err(quote! { NoFrame |frame| { } });
        assert!(err.contains("without a frame takes no binding"));

        let err = expand_err(quote! { WithFrame { a: u8 } || { } });
        assert!(err.contains("needs a binding"));
    }

    #[test]
    fn test_empty_invocation_rejected() {
        let err = expand_err(quote! {});
        assert!(err.contains("at least one routine"));
    }
}
