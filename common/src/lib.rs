pub mod group;
pub mod location;
pub mod order;
pub mod product;
pub mod vendor;
