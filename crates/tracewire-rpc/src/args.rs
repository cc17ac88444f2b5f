//! Positional argument rewriting for instrumented client calls.

use crate::call::{Arg, Callback};
use tracewire_core::MetadataBag;

/// Whether the first two arguments already include a metadata bag.
pub fn carries_metadata(args: &[Arg]) -> bool {
    args.iter().take(2).any(Arg::is_metadata)
}

/// Insert `metadata` after the first argument and wrap every callback.
///
/// An empty argument list becomes just the metadata bag. The relative order
/// of the original arguments is preserved.
pub fn rewrite_arguments(
    args: Vec<Arg>,
    metadata: MetadataBag,
    mut wrap: impl FnMut(Callback) -> Callback,
) -> Vec<Arg> {
    if args.is_empty() {
        return vec![Arg::Metadata(metadata)];
    }

    let mut metadata = Some(metadata);
    let mut rewritten = Vec::with_capacity(args.len() + 1);
    for arg in args {
        rewritten.push(match arg {
            Arg::Callback(callback) => Arg::Callback(wrap(callback)),
            other => other,
        });
        if let Some(bag) = metadata.take() {
            rewritten.push(Arg::Metadata(bag));
        }
    }
    rewritten
}
