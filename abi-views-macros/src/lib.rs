//! # abi-views Macros
//!
//! Procedural macros for the abi-views library.
//!
//! **Note**: These macros are re-exported by the main `abi-views` crate.
//! Users should import them from `abi_views` instead of depending on this crate directly.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, LitStr};

/// Validates a fixed SQL query at compile time against the Postgres dialect
/// and re-emits it as a `&'static str` literal.
///
/// Bind placeholders (`$1`, `$2`, ...) are accepted.
///
/// # Example
/// ```
/// use abi_views_macros::validated_sql;
/// const QUERY: &str = validated_sql!("SELECT contract_address FROM contracts LIMIT $1");
/// ```
#[proc_macro]
pub fn validated_sql(input: TokenStream) -> TokenStream {
    let query = parse_macro_input!(input as LitStr);

    let dialect = sqlparser::dialect::PostgreSqlDialect {};

    match sqlparser::parser::Parser::parse_sql(&dialect, &query.value()) {
        Ok(statements) if statements.len() == 1 => {}
        Ok(statements) => {
            let msg = format!(
                "validated_sql! expects exactly one statement, found {}",
                statements.len()
            );
            return syn::Error::new_spanned(&query, msg).to_compile_error().into();
        }
        Err(e) => {
            let msg = format!("SQL parse error: {e}");
            return quote! { compile_error!(#msg); }.into();
        }
    }

    quote! { #query }.into()
}
