pub mod ply;

pub use ply::load_point_cloud;
