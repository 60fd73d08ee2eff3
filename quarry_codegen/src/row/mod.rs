//!
//! Row adapters: conversion of a single cursor row into one result element.
//!

use proc_macro2::TokenStream;
use std::collections::BTreeSet;

use crate::relation::RelationCollector;
use crate::CodeGenScope;

mod entity;
mod scalar;

pub use entity::{EntityField, EntityRowAdapter};
pub use scalar::ScalarRowAdapter;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RowAdapterKind {
    /// Reads a single column.
    Scalar,
    /// Maps columns onto the fields of a struct.
    Entity,
}

/// Relation collectors of an object-mapping row adapter.
#[derive(Clone, Copy)]
pub struct RelationInfo<'a> {
    collectors: &'a [RelationCollector],
}

impl<'a> RelationInfo<'a> {
    pub fn new(collectors: &'a [RelationCollector]) -> Self {
        Self { collectors }
    }

    pub fn collectors(&self) -> &'a [RelationCollector] {
        self.collectors
    }

    /// Every table read by the secondary queries of the collectors.
    pub fn table_names(&self) -> BTreeSet<String> {
        self.collectors
            .iter()
            .flat_map(RelationCollector::table_names)
            .collect()
    }
}

///
/// Variables declared by [`RowAdapter::on_cursor_ready`],
/// to be used by [`RowAdapter::convert`] on the same cursor.
///
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    /// Column index variables, in adapter-defined order.
    pub columns: Vec<syn::Ident>,
    pub relations: Vec<RelationBinding>,
}

#[derive(Clone, Debug)]
pub struct RelationBinding {
    /// Index of the parent key column in the parent cursor.
    pub key_index: syn::Ident,
    /// Map from parent key to the related elements.
    pub groups: syn::Ident,
}

///
/// A strategy turning the current row of a cursor into one value.
///
/// The adapter is asked to prepare once per cursor, then to convert
/// any number of rows of that cursor.
///
pub trait RowAdapter {
    fn kind(&self) -> RowAdapterKind;

    /// The element type produced per row.
    fn out_type(&self) -> TokenStream;

    /// Capability query for adapters that run secondary relation queries.
    fn relation_info(&self) -> Option<RelationInfo<'_>> {
        None
    }

    /// Emit per-cursor preparation (column lookup, relation prefetch).
    ///
    /// Relation prefetch iterates and rewinds `cursor`, which is only
    /// possible on a copied cursor.
    fn on_cursor_ready(&self, cursor: &syn::Ident, scope: &mut CodeGenScope) -> Bindings;

    /// Emit `let #out = ..;` converting the current row of `cursor`.
    fn convert(
        &self,
        bindings: &Bindings,
        out: &syn::Ident,
        cursor: &syn::Ident,
        scope: &mut CodeGenScope,
    );

    /// An expression that is `true` when every column read by this adapter is NULL.
    fn null_check(&self, _bindings: &Bindings, _cursor: &syn::Ident) -> Option<TokenStream> {
        None
    }
}
