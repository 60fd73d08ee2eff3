use proc_macro2::Span;
use syn::parse::ParseStream;

use crate::attr::attr_util;

///
/// ```text
/// #[relation(parent = "id", entity = "author_id")]
/// #[relation(parent = "id", entity = "id", junction(table = "book_tag", parent = "book_id", entity = "tag_id"))]
/// ```
///
/// `parent` is a column of the parent row, `entity` a column of the related table.
///
pub struct RelationAttr {
    pub span: Span,
    pub parent_column: syn::LitStr,
    pub entity_column: syn::LitStr,
    pub junction: Option<JunctionAttr>,
}

/// `parent` and `entity` are columns of the junction table.
pub struct JunctionAttr {
    pub table: syn::LitStr,
    pub parent_column: syn::LitStr,
    pub entity_column: syn::LitStr,
}

impl syn::parse::Parse for RelationAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let span = input.span();
        let mut parent_column = None;
        let mut entity_column = None;
        let mut junction = None;

        attr_util::parse_key_values(input, |key, input| {
            if key == "parent" {
                parent_column = Some(attr_util::parse_eq_str(input)?);
            } else if key == "entity" {
                entity_column = Some(attr_util::parse_eq_str(input)?);
            } else if key == "junction" {
                let content;
                let _paren_token = syn::parenthesized!(content in input);
                junction = Some(content.parse()?);
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    "Expected `parent`, `entity` or `junction`",
                ));
            }
            Ok(())
        })?;

        Ok(Self {
            span,
            parent_column: parent_column
                .ok_or_else(|| syn::Error::new(span, "Missing `parent = \"column\"`"))?,
            entity_column: entity_column
                .ok_or_else(|| syn::Error::new(span, "Missing `entity = \"column\"`"))?,
            junction,
        })
    }
}

impl syn::parse::Parse for JunctionAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let span = input.span();
        let mut table = None;
        let mut parent_column = None;
        let mut entity_column = None;

        attr_util::parse_key_values(input, |key, input| {
            if key == "table" {
                table = Some(attr_util::parse_eq_str(input)?);
            } else if key == "parent" {
                parent_column = Some(attr_util::parse_eq_str(input)?);
            } else if key == "entity" {
                entity_column = Some(attr_util::parse_eq_str(input)?);
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    "Expected `table`, `parent` or `entity`",
                ));
            }
            Ok(())
        })?;

        let missing = |what: &str| syn::Error::new(span, format!("Junction is missing `{}`", what));

        Ok(Self {
            table: table.ok_or_else(|| missing("table"))?,
            parent_column: parent_column.ok_or_else(|| missing("parent"))?,
            entity_column: entity_column.ok_or_else(|| missing("entity"))?,
        })
    }
}
