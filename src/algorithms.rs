pub mod analysis;
pub mod dfs;
pub mod scc;
pub mod top_k;
