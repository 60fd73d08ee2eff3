use proc_macro2::TokenStream;
use quote::{quote, ToTokens};

use super::{Bindings, RowAdapter, RowAdapterKind};
use crate::CodeGenScope;

///
/// Reads one column of the row through `FromValue`.
///
/// Without an explicit column name, the first column is read.
///
pub struct ScalarRowAdapter {
    ty: syn::Type,
    column: Option<String>,
}

impl ScalarRowAdapter {
    pub fn new(ty: syn::Type, column: Option<String>) -> Self {
        Self { ty, column }
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }
}

impl RowAdapter for ScalarRowAdapter {
    fn kind(&self) -> RowAdapterKind {
        RowAdapterKind::Scalar
    }

    fn out_type(&self) -> TokenStream {
        self.ty.to_token_stream()
    }

    fn on_cursor_ready(&self, cursor: &syn::Ident, scope: &mut CodeGenScope) -> Bindings {
        let index = scope.tmp_var("index");

        scope.push(match &self.column {
            Some(column) => quote! {
                let #index = #cursor.column_index_or_err(#column)?;
            },
            None => quote! {
                let #index: usize = 0;
            },
        });

        Bindings {
            columns: vec![index],
            relations: vec![],
        }
    }

    fn convert(
        &self,
        bindings: &Bindings,
        out: &syn::Ident,
        cursor: &syn::Ident,
        scope: &mut CodeGenScope,
    ) {
        let ty = &self.ty;
        let index = &bindings.columns[0];

        scope.push(quote! {
            let #out = #cursor.get::<#ty>(#index)?;
        });
    }

    /// `None` for `Option<T>`, where NULL is a value of its own.
    fn null_check(&self, bindings: &Bindings, cursor: &syn::Ident) -> Option<TokenStream> {
        if is_option(&self.ty) {
            return None;
        }
        let index = &bindings.columns[0];
        Some(quote! { #cursor.is_null(#index)? })
    }
}

fn is_option(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .map_or(false, |segment| segment.ident == "Option"),
        _ => false,
    }
}
