pub mod pool_math;
pub mod wad_ray;
