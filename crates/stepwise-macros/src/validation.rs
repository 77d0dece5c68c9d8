//! Resume-point assignment and numbering checks.
//!
//! Automatic numbering gives segment `k` the identifier `k`. Manual numbering
//! maps `yield n` to a resume point of `n + 1`, verbatim. Mistakes that can be
//! seen at expansion time are reported here with spans; everything else about
//! manual numbering is left to the author.

use std::collections::HashMap;

use crate::parsing::{Body, Declaration, NumberingKind, Options};

/// Completed sentinel of the runtime cursor (`u64::MAX - 1`).
const COMPLETED: u64 = u64::MAX - 1;

/// Largest identifier whose resume point stays below the completed sentinel.
pub(crate) const MAX_MANUAL_ID: u64 = COMPLETED - 2;

/// Reject options that make no sense for the form they appear on.
pub(crate) fn validate_declaration_options(options: &Options) -> syn::Result<()> {
    if let Some((_, span)) = options.numbering {
        return Err(syn::Error::new(
            span,
            "`#[numbering]` belongs on the routine body; a declaration has no suspension points",
        ));
    }
    Ok(())
}

/// `#[frame]` needs frame fields to land on.
pub(crate) fn validate_frame_options(declaration: &Declaration) -> syn::Result<()> {
    match (declaration.options.frame_span, &declaration.fields) {
        (Some(span), None) => Err(syn::Error::new(
            span,
            "`#[frame]` has nothing to apply to; this routine has no frame fields",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn validate_implementation_options(options: &Options) -> syn::Result<()> {
    if let Some(span) = options.frame_span {
        return Err(syn::Error::new(
            span,
            "`#[frame]` belongs on the routine declaration that defines the frame fields",
        ));
    }
    Ok(())
}

/// Compute the resume point of every segment, in program order.
pub(crate) fn resume_points(numbering: NumberingKind, body: &Body) -> syn::Result<Vec<u64>> {
    let mut points = vec![0];
    let mut seen: HashMap<u64, proc_macro2::Span> = HashMap::new();

    let directives = body
        .segments
        .iter()
        .filter_map(|segment| segment.directive.as_ref());

    for (index, directive) in directives.enumerate() {
        match (numbering, &directive.id) {
            (NumberingKind::Automatic, None) => points.push(index as u64 + 1),
            (NumberingKind::Automatic, Some(id)) => {
                return Err(syn::Error::new(
                    id.span(),
                    "explicit resume point given, but this routine uses automatic numbering; \
                     remove it or add `#[numbering(manual)]`",
                ));
            }
            (NumberingKind::Manual, None) => {
                return Err(syn::Error::new(
                    directive.yield_token.span,
                    "manual numbering requires an identifier at every suspension point, e.g. `yield 0;`",
                ));
            }
            (NumberingKind::Manual, Some(id)) => {
                let value: u64 = id.base10_parse()?;
                if value > MAX_MANUAL_ID {
                    return Err(syn::Error::new(
                        id.span(),
                        format!(
                            "resume point {} collides with the reserved completed sentinel (max {})",
                            value, MAX_MANUAL_ID
                        ),
                    ));
                }
                if let Some(first) = seen.get(&value) {
                    let mut err = syn::Error::new(
                        id.span(),
                        format!("duplicate resume point {}", value),
                    );
                    err.combine(syn::Error::new(*first, "first used here"));
                    return Err(err);
                }
                seen.insert(value, id.span());
                points.push(value + 1);
            }
        }
    }

    Ok(points)
}
