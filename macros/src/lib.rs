use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn};

/// Marks a test function.
///
/// Sync functions expand to `#[test]`. Async functions run on a tokio
/// runtime: `#[rxvar_macro::test]` uses the current-thread flavor and
/// `#[rxvar_macro::test(threaded)]` the multi-thread one.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);
  let is_async = input.sig.asyncness.is_some();

  let raw_args = proc_macro2::TokenStream::from(attr);
  let tokio_args = if raw_args.is_empty() {
    proc_macro2::TokenStream::new()
  } else if !is_async {
    return syn::Error::new(
      raw_args.span(),
      "rxvar_macro::test arguments are only supported for async tests",
    )
    .to_compile_error()
    .into();
  } else {
    match syn::parse2::<Ident>(raw_args.clone()) {
      Ok(ident) if ident == "threaded" => quote!(flavor = "multi_thread"),
      Ok(ident) if ident == "current" => quote!(flavor = "current_thread"),
      _ => {
        return syn::Error::new(
          raw_args.span(),
          "rxvar_macro::test only accepts: #[rxvar_macro::test], \
           #[rxvar_macro::test(current)] or #[rxvar_macro::test(threaded)]",
        )
        .to_compile_error()
        .into();
      }
    }
  };

  let attr = if is_async { quote!(tokio::test(#tokio_args)) } else { quote!(test) };

  TokenStream::from(quote! {
    #[#attr]
    #input
  })
}
