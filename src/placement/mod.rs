//! Suggests where text should go by looking for the largest calm area of the background.

pub(crate) mod auto;
