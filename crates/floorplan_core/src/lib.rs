pub mod domain;
pub mod grid;
pub mod ports;

pub use domain::{
    Identity, InvalidProduct, NewStoreRecord, Product, ProductDraft, ProductId,
    ProfileAttributes, Square, SquareType, Store, StoreId, StoreRecord,
};
pub use grid::{Grid, GridError, ParseError};
pub use ports::{BackendService, IdentityProvider, PortError, PortResult};
