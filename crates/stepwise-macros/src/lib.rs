//! Stepwise Macros - the `routine!` definition macro
//!
//! Turns a routine body written as straight-line Rust with suspension
//! directives into a marker type, a frame record and a `Routine` impl whose
//! `dispatch` jumps to the segment named by the cursor.
//!
//! Use it through `stepwise_runtime::routine`; the generated code refers to
//! `::stepwise_runtime` paths.

use proc_macro::TokenStream;

mod codegen;
mod parsing;
mod validation;

/// Define, declare or implement resumable routines.
///
/// ```text
/// routine! {
///     /// Docs land on the marker type.
///     #[frame(derive(Debug))]
///     pub Name { field: Type, ... } |frame| {
///         // segment 0
///         yield;
///         // segment 1, re-run until the condition holds
///         yield until frame.field > 3;
///         // last segment; `exit!()` completes early
///     }
///
///     pub Frameless || { yield; }
///
///     // declaration and definition apart
///     pub Split { a: u32 };
///     impl path::to::Split |frame| { frame.a += 1; }
///
///     #[numbering(manual)]
///     Numbered || { yield 10; yield 20 until ready(); }
/// }
/// ```
///
/// A bare `return;` inside a segment leaves the cursor where it is, so the
/// whole segment runs again on the next call.
#[proc_macro]
pub fn routine(input: TokenStream) -> TokenStream {
    codegen::expand(input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
