//! Domain models

pub mod catalog;
pub mod client;
pub mod quote;
pub mod shopping_list;

pub use catalog::{Service, ServiceFields, ServiceRecord};
pub use client::{Client, ClientInput};
pub use quote::{
    ClientSnapshot, MaterialItem, MaterialMode, Quote, QuoteItem, QuoteRecord, QuoteStatus,
};
pub use shopping_list::{ShoppingList, ShoppingListEntry};
