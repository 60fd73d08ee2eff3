use syn::parse::ParseStream;

use crate::attr::attr_util;

///
/// Arguments of the `#[quarry::database(..)]` attribute.
///
/// ```text
/// #[quarry::database(runtime = "my_crate::quarry")]
/// ```
///
pub struct Options {
    /// Path of the runtime crate used by emitted code.
    pub runtime: syn::Path,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            runtime: syn::parse_quote!(::quarry),
        }
    }
}

impl syn::parse::Parse for Options {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut options = Self::default();

        attr_util::parse_key_values(input, |key, input| {
            if key == "runtime" {
                options.runtime = attr_util::parse_eq_str(input)?.parse()?;
                Ok(())
            } else {
                Err(syn::Error::new(key.span(), "Unrecognized option"))
            }
        })?;

        Ok(options)
    }
}
