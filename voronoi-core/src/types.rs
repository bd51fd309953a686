/// Identifier for a seed in a [`crate::seed::SeedSet`].
///
/// This is an index into the set's slots, and is only meaningful within
/// the lifetime of a given `SeedSet` instance.
pub type SeedId = usize;
