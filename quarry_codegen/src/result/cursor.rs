use quote::quote;

use super::QueryResultAdapter;
use crate::row::RowAdapter;
use crate::CodeGenScope;

/// The raw rows themselves, as a `MemoryCursor` snapshot.
pub struct CursorResultAdapter;

impl QueryResultAdapter for CursorResultAdapter {
    fn row_adapter(&self) -> Option<&dyn RowAdapter> {
        None
    }

    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope) {
        let rt = scope.runtime().clone();

        scope.push(quote! {
            let #out = #rt::copy_cursor(&mut #cursor)?;
        });
    }
}

/// The number of rows, as a `RowCount`.
pub struct RowCountResultAdapter;

impl QueryResultAdapter for RowCountResultAdapter {
    fn row_adapter(&self) -> Option<&dyn RowAdapter> {
        None
    }

    fn convert(&self, out: &syn::Ident, cursor: &syn::Ident, scope: &mut CodeGenScope) {
        let rt = scope.runtime().clone();
        let count = scope.tmp_var("count");

        scope.push(quote! {
            let mut #count: usize = 0;
            while #cursor.move_to_next() {
                #count += 1;
            }
            let #out = #rt::RowCount(#count);
        });
    }
}
