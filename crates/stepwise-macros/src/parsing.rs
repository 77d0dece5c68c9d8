//! Parsing of `routine!` input.
//!
//! The body of a routine is ordinary Rust split at top-level suspension
//! directives. Everything between two directives is parsed as statements by
//! syn; the directives themselves are parsed here.

use proc_macro2::{Span, TokenStream, TokenTree};
use syn::{
    braced,
    parse::{Parse, ParseStream, Parser},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Block, Expr, Field, Ident, LitInt, Meta, Path, Stmt, Token, Visibility,
};

mod kw {
    syn::custom_keyword!(until);
    syn::custom_keyword!(manual);
    syn::custom_keyword!(automatic);
}

/// Numbering discipline selected with `#[numbering(...)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberingKind {
    Automatic,
    Manual,
}

/// Everything inside one `routine! { ... }` invocation
pub(crate) struct RoutineItems(pub(crate) Vec<RoutineItem>);

/// One routine form
pub(crate) enum RoutineItem {
    /// `Name { fields } |frame| { body }` or `Name || { body }`
    Define(Declaration, Body),
    /// `Name { fields };` or `Name;`
    Declare(Declaration),
    /// `impl path::Name |frame| { body }`
    Implement(Implementation),
}

/// Routine options pulled out of the outer attributes
pub(crate) struct Options {
    /// Attributes passed through to the generated marker type
    pub(crate) attrs: Vec<Attribute>,
    pub(crate) numbering: Option<(NumberingKind, Span)>,
    /// Contents of `#[frame(...)]`, applied to the frame struct
    pub(crate) frame_attrs: Vec<Meta>,
    pub(crate) frame_span: Option<Span>,
}

pub(crate) struct Declaration {
    pub(crate) options: Options,
    pub(crate) vis: Visibility,
    pub(crate) name: Ident,
    /// `None` for frameless routines
    pub(crate) fields: Option<Vec<Field>>,
}

pub(crate) struct Implementation {
    pub(crate) options: Options,
    pub(crate) path: Path,
    pub(crate) body: Body,
}

/// `|binding| { ... }` or `|| { ... }`
pub(crate) struct Body {
    /// `None` for frameless routines
    pub(crate) binding: Option<Ident>,
    pub(crate) bars_span: Span,
    pub(crate) segments: Vec<Segment>,
}

/// Code between two suspension points
pub(crate) struct Segment {
    pub(crate) stmts: Vec<Stmt>,
    /// `None` for the final segment, which completes the routine
    pub(crate) directive: Option<Directive>,
}

/// `yield [n] [until <expr>];`
pub(crate) struct Directive {
    pub(crate) yield_token: Token![yield],
    pub(crate) id: Option<LitInt>,
    pub(crate) until: Option<Expr>,
}

impl Parse for RoutineItems {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut items = Vec::new();
        while !input.is_empty() {
            items.push(input.parse()?);
        }
        if items.is_empty() {
            return Err(input.error("expected at least one routine definition"));
        }
        Ok(RoutineItems(items))
    }
}

impl Parse for RoutineItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let options = Options::from_attrs(Attribute::parse_outer(input)?)?;

        if input.peek(Token![impl]) {
            input.parse::<Token![impl]>()?;
            let path: Path = input.parse()?;
            let body = parse_body(input)?;
            return Ok(RoutineItem::Implement(Implementation {
                options,
                path,
                body,
            }));
        }

        let vis: Visibility = input.parse()?;
        let name: Ident = input.parse()?;

        let fields = if input.peek(syn::token::Brace) {
            let content;
            braced!(content in input);
            let fields = Punctuated::<Field, Token![,]>::parse_terminated_with(
                &content,
                Field::parse_named,
            )?;
            Some(fields.into_iter().collect())
        } else {
            None
        };

        let declaration = Declaration {
            options,
            vis,
            name,
            fields,
        };

        if input.peek(Token![;]) {
            input.parse::<Token![;]>()?;
            return Ok(RoutineItem::Declare(declaration));
        }

        let body = parse_body(input)?;
        if body.binding.is_some() && declaration.fields.is_none() {
            return Err(syn::Error::new(
                body.bars_span,
                "a routine without a frame takes no binding; write `||` or declare frame fields",
            ));
        }
        if body.binding.is_none() && declaration.fields.is_some() {
            return Err(syn::Error::new(
                body.bars_span,
                "a routine with frame fields needs a binding for its frame, e.g. `|frame|`",
            ));
        }
        Ok(RoutineItem::Define(declaration, body))
    }
}

impl Options {
    fn from_attrs(attrs: Vec<Attribute>) -> syn::Result<Self> {
        let mut options = Options {
            attrs: Vec::new(),
            numbering: None,
            frame_attrs: Vec::new(),
            frame_span: None,
        };

        for attr in attrs {
            if attr.path().is_ident("numbering") {
                if options.numbering.is_some() {
                    return Err(syn::Error::new_spanned(
                        &attr,
                        "`#[numbering]` given more than once",
                    ));
                }
                let kind = attr.parse_args_with(|input: ParseStream| {
                    let lookahead = input.lookahead1();
                    if lookahead.peek(kw::manual) {
                        input.parse::<kw::manual>()?;
                        Ok(NumberingKind::Manual)
                    } else if lookahead.peek(kw::automatic) {
                        input.parse::<kw::automatic>()?;
                        Ok(NumberingKind::Automatic)
                    } else {
                        Err(lookahead.error())
                    }
                })?;
                options.numbering = Some((kind, attr.span()));
            } else if attr.path().is_ident("frame") {
                let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
                options.frame_attrs.extend(metas);
                options.frame_span = Some(attr.span());
            } else {
                options.attrs.push(attr);
            }
        }

        Ok(options)
    }
}

fn parse_body(input: ParseStream) -> syn::Result<Body> {
    let (binding, bars_span) = if input.peek(Token![||]) {
        let bars: Token![||] = input.parse()?;
        (None, bars.span())
    } else if input.peek(Token![|]) {
        let open: Token![|] = input.parse()?;
        let binding: Ident = input.parse()?;
        input.parse::<Token![|]>()?;
        (Some(binding), open.span())
    } else {
        return Err(input.error("expected `|frame|` or `||` before the routine body"));
    };

    let content;
    braced!(content in input);
    let tokens: TokenStream = content.parse()?;
    let segments = split_segments(tokens)?;

    Ok(Body {
        binding,
        bars_span,
        segments,
    })
}

/// Split a body at top-level `yield ... ;` directives.
///
/// Only tokens at the top level of the body are inspected; anything inside a
/// group (a nested block, a closure body, a macro call) is left to the
/// compiler.
pub(crate) fn split_segments(tokens: TokenStream) -> syn::Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut current: Vec<TokenTree> = Vec::new();
    let mut iter = tokens.into_iter();

    while let Some(tree) = iter.next() {
        let is_yield = matches!(&tree, TokenTree::Ident(ident) if ident == "yield");
        if !is_yield {
            current.push(tree);
            continue;
        }

        let yield_span = tree.span();
        let mut directive_tokens = vec![tree];
        let mut terminated = false;
        for next in iter.by_ref() {
            if matches!(&next, TokenTree::Punct(p) if p.as_char() == ';') {
                terminated = true;
                break;
            }
            directive_tokens.push(next);
        }
        if !terminated {
            return Err(syn::Error::new(
                yield_span,
                "expected `;` after suspension directive",
            ));
        }

        let directive: Directive = syn::parse2(directive_tokens.into_iter().collect())?;
        let stmts = parse_stmts(current.drain(..).collect())?;
        segments.push(Segment {
            stmts,
            directive: Some(directive),
        });
    }

    segments.push(Segment {
        stmts: parse_stmts(current.into_iter().collect())?,
        directive: None,
    });

    Ok(segments)
}

/// Parse a run of statements, terminating a trailing expression so that more
/// code can follow it.
fn parse_stmts(tokens: TokenStream) -> syn::Result<Vec<Stmt>> {
    let mut stmts = Block::parse_within.parse2(tokens)?;
    match stmts.last_mut() {
        Some(Stmt::Expr(_, semi)) if semi.is_none() => *semi = Some(Default::default()),
        Some(Stmt::Macro(mac)) if mac.semi_token.is_none() => {
            mac.semi_token = Some(Default::default())
        }
        _ => {}
    }
    Ok(stmts)
}

impl Parse for Directive {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let yield_token: Token![yield] = input.parse()?;

        let id = if input.peek(LitInt) {
            Some(input.parse()?)
        } else {
            None
        };

        let until = if input.peek(kw::until) {
            input.parse::<kw::until>()?;
            Some(input.parse()?)
        } else {
            None
        };

        if !input.is_empty() {
            return Err(input.error(
                "expected `yield;`, `yield until <condition>;` or, with manual numbering, `yield <n>;`",
            ));
        }

        Ok(Directive {
            yield_token,
            id,
            until,
        })
    }
}
