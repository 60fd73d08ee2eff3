use proc_macro2::TokenStream;
use quote::{quote, ToTokens};

use super::{Bindings, RelationInfo, RowAdapter, RowAdapterKind};
use crate::relation::RelationCollector;
use crate::CodeGenScope;

/// A struct field read from a column of the same row.
pub struct EntityField {
    pub ident: syn::Ident,
    pub column: String,
    pub ty: syn::Type,
}

///
/// Maps the columns of a row onto the fields of a struct.
///
/// Relation fields are not read from the row. They are filled from
/// secondary queries described by the adapter's relation collectors.
///
pub struct EntityRowAdapter {
    path: syn::Path,
    fields: Vec<EntityField>,
    relations: Vec<RelationCollector>,
}

impl EntityRowAdapter {
    pub fn new(path: syn::Path, fields: Vec<EntityField>, relations: Vec<RelationCollector>) -> Self {
        Self {
            path,
            fields,
            relations,
        }
    }

    pub fn path(&self) -> &syn::Path {
        &self.path
    }
}

impl RowAdapter for EntityRowAdapter {
    fn kind(&self) -> RowAdapterKind {
        RowAdapterKind::Entity
    }

    fn out_type(&self) -> TokenStream {
        self.path.to_token_stream()
    }

    fn relation_info(&self) -> Option<RelationInfo<'_>> {
        Some(RelationInfo::new(&self.relations))
    }

    fn on_cursor_ready(&self, cursor: &syn::Ident, scope: &mut CodeGenScope) -> Bindings {
        let columns = self
            .fields
            .iter()
            .map(|field| {
                let index = scope.tmp_var("index");
                let column = &field.column;
                scope.push(quote! {
                    let #index = #cursor.column_index_or_err(#column)?;
                });
                index
            })
            .collect();

        let relations = self
            .relations
            .iter()
            .map(|collector| collector.prepare(cursor, scope))
            .collect();

        Bindings { columns, relations }
    }

    fn convert(
        &self,
        bindings: &Bindings,
        out: &syn::Ident,
        cursor: &syn::Ident,
        scope: &mut CodeGenScope,
    ) {
        let path = &self.path;

        let field_inits = self
            .fields
            .iter()
            .zip(bindings.columns.iter())
            .map(|(field, index)| {
                let ident = &field.ident;
                let ty = &field.ty;
                quote! { #ident: #cursor.get::<#ty>(#index)? }
            });

        let relation_inits = self
            .relations
            .iter()
            .zip(bindings.relations.iter())
            .map(|(collector, binding)| {
                let ident = collector.field();
                let value = collector.attach(binding, cursor);
                quote! { #ident: #value }
            });

        scope.push(quote! {
            let #out = #path {
                #(#field_inits,)*
                #(#relation_inits,)*
            };
        });
    }

    fn null_check(&self, bindings: &Bindings, cursor: &syn::Ident) -> Option<TokenStream> {
        let mut checks = bindings
            .columns
            .iter()
            .map(|index| quote! { #cursor.is_null(#index)? });

        let first = checks.next()?;
        let all = checks.fold(first, |all, check| quote! { #all && #check });

        Some(quote! { (#all) })
    }
}
