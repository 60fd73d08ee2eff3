#![forbid(unsafe_code)]

extern crate proc_macro;

use proc_macro::TokenStream;

///
/// Generate query functions for a module of mapping structs and query declarations.
///
/// ```ignore
/// #[quarry::database]
/// pub mod library {
///     #[table("book")]
///     #[derive(Clone)]
///     pub struct Book {
///         pub id: i64,
///         pub title: String,
///     }
///
///     #[query("SELECT * FROM book WHERE id = $1")]
///     pub fn book(id: i64) -> Option<Book>;
/// }
/// ```
///
#[proc_macro_attribute]
pub fn database(args: TokenStream, input: TokenStream) -> TokenStream {
    let options = syn::parse_macro_input!(args as quarry_codegen::Options);
    let module = syn::parse_macro_input!(input as quarry_codegen::database::DatabaseMod);

    TokenStream::from(quarry_codegen::database::expand(module, &options))
}
