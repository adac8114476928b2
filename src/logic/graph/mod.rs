pub mod swap_path;

pub use swap_path::{PathError, SwapPath, SwapPathHash, generate_swap_path_hash};
