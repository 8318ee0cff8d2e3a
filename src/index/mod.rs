// Edit-LSH: Indexing
//
// Bucket index for one hash family instance, the K-member ensemble built on
// top of it, and candidate pair generation over both.

pub mod bucket;
pub mod ensemble;
pub mod pairs;
