//!
//! Expansion of `#[quarry::database] mod name { .. }`.
//!
//! The module is the unit of analysis: mapping structs and the queries
//! returning them are declared side by side, so the solver can see every
//! struct a return type refers to.
//!

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::ParseStream;

use crate::query::{self, QueryMethod};
use crate::schema::{EntityDef, Schema};
use crate::solver::Solver;
use crate::Options;

pub struct DatabaseMod {
    pub attrs: Vec<syn::Attribute>,
    pub vis: syn::Visibility,
    pub ident: syn::Ident,
    pub items: Vec<ModItem>,
}

pub enum ModItem {
    /// A struct, with its mapping attributes stripped.
    Struct(syn::ItemStruct, syn::Result<Option<EntityDef>>),
    Query(syn::Result<QueryMethod>),
    /// Anything else, emitted unchanged.
    Other(syn::Item),
}

impl syn::parse::Parse for DatabaseMod {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(syn::Attribute::parse_outer)?;
        let vis: syn::Visibility = input.parse()?;
        let _: syn::token::Mod = input.parse()?;
        let ident: syn::Ident = input.parse()?;

        let content;
        let _brace_token = syn::braced!(content in input);

        let mut items = Vec::new();
        while !content.is_empty() {
            items.push(content.parse()?);
        }

        Ok(Self {
            attrs,
            vis,
            ident,
            items,
        })
    }
}

impl syn::parse::Parse for ModItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if is_query_declaration(input) {
            let attrs = input.call(syn::Attribute::parse_outer)?;
            let vis: syn::Visibility = input.parse()?;
            let mut method: syn::TraitItemMethod = input.parse()?;
            method.attrs = attrs;

            return Ok(Self::Query(QueryMethod::from_method(vis, method)));
        }

        match input.parse::<syn::Item>()? {
            syn::Item::Struct(mut item) => {
                let entity = EntityDef::from_struct(&mut item);
                Ok(Self::Struct(item, entity))
            }
            item => Ok(Self::Other(item)),
        }
    }
}

/// A bodyless `fn` item, which is not valid Rust outside a trait.
fn is_query_declaration(input: ParseStream) -> bool {
    let fork = input.fork();
    let _ = fork.call(syn::Attribute::parse_outer);
    let _ = fork.parse::<syn::Visibility>();

    fork.peek(syn::token::Fn)
        && fork
            .parse::<syn::TraitItemMethod>()
            .map_or(false, |method| method.default.is_none())
}

pub fn expand(module: DatabaseMod, options: &Options) -> TokenStream {
    let mut schema = Schema::new();
    let mut errors = vec![];
    let mut structs = vec![];
    let mut queries = vec![];
    let mut others = vec![];

    for item in module.items {
        match item {
            ModItem::Struct(item, entity) => {
                match entity {
                    Ok(Some(entity)) => {
                        if let Some(table) = &entity.table {
                            let ident = &entity.ident;
                            structs.push(quote! {
                                impl #ident {
                                    pub const TABLE_NAME: &'static str = #table;
                                }
                            });
                        }
                        schema.insert(entity);
                    }
                    Ok(None) => {}
                    Err(error) => errors.push(error.to_compile_error()),
                }
                structs.push(quote! { #item });
            }
            ModItem::Query(Ok(method)) => queries.push(method),
            ModItem::Query(Err(error)) => errors.push(error.to_compile_error()),
            ModItem::Other(item) => others.push(item),
        }
    }

    let solver = Solver::new(&schema);
    let query_fns = queries
        .iter()
        .map(|method| query::gen_query_fn(method, &solver, options));

    let attrs = &module.attrs;
    let vis = &module.vis;
    let ident = &module.ident;

    quote! {
        #(#attrs)*
        #vis mod #ident {
            #(#others)*
            #(#structs)*
            #(#query_fns)*
            #(#errors)*
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(source: &str) -> String {
        let module: DatabaseMod = syn::parse_str(source).unwrap();
        expand(module, &Options::default()).to_string()
    }

    #[test]
    fn splits_items() {
        let module: DatabaseMod = syn::parse_str(
            r#"
            pub mod library {
                use std::collections::HashMap;

                #[table("book")]
                #[derive(Clone)]
                pub struct Book {
                    pub id: i64,
                }

                /// Every book.
                #[query("SELECT * FROM book")]
                pub fn books() -> Vec<Book>;

                fn helper() -> i64 { 1 }
            }
            "#,
        )
        .unwrap();

        let kinds: Vec<&str> = module
            .items
            .iter()
            .map(|item| match item {
                ModItem::Struct(..) => "struct",
                ModItem::Query(..) => "query",
                ModItem::Other(..) => "other",
            })
            .collect();

        assert_eq!(kinds, vec!["other", "struct", "query", "other"]);
    }

    #[test]
    fn emits_plain_structs_and_table_names() {
        let expanded = expand_str(
            r#"
            mod library {
                #[table("book")]
                pub struct Book {
                    #[column("book_id")]
                    pub id: i64,
                }

                #[query("SELECT * FROM book")]
                pub fn books() -> Vec<Book>;
            }
            "#,
        );

        assert!(expanded.contains("pub const TABLE_NAME : & 'static str = \"book\""));
        assert!(expanded.contains("pub async fn books < C >"));
        assert!(expanded.contains("BOOKS_QUERY"));
        assert!(!expanded.contains("# [table"));
        assert!(!expanded.contains("# [column"));
    }

    #[test]
    fn errors_stay_local() {
        let expanded = expand_str(
            r#"
            mod library {
                #[query("SELECT 1")]
                fn broken(&self) -> i64;

                #[query("SELECT 1")]
                pub fn one() -> i64;
            }
            "#,
        );

        assert!(expanded.contains("compile_error"));
        assert!(expanded.contains("pub async fn one < C >"));
    }
}
