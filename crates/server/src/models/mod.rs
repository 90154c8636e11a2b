//! Domain models owned by the server.

mod product;

pub use product::{BinLocation, Product, SecondaryLocation, StoreLink, StoreLinks};
