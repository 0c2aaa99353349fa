// Adapted from `validator_derive` (https://github.com/Keats/validator).
//
// See LICENSE for details.

use inflections::Inflect;
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derives a `Validate` implementation that walks every field of a struct,
/// reusing whatever implementation each field type already has.
///
/// A struct may additionally carry `#[gltf(validate_hook = "some_fn")]` to run
/// extra, cross-field checks after every field has been validated.
#[proc_macro_derive(Validate, attributes(gltf))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand(&ast).into()
}

fn validate_hook(ast: &DeriveInput) -> Option<syn::Ident> {
    for attr in &ast.attrs {
        if !attr.path().is_ident("gltf") {
            continue;
        }
        let mut hook = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("validate_hook") {
                let value = meta.value()?;
                let lit: syn::LitStr = value.parse()?;
                hook = Some(syn::Ident::new(&lit.value(), lit.span()));
            }
            Ok(())
        })
        .expect("invalid #[gltf(...)] attribute");
        if hook.is_some() {
            return hook;
        }
    }
    None
}

fn expand(ast: &DeriveInput) -> proc_macro2::TokenStream {
    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("#[derive(Validate)] only supports structs with named fields"),
        },
        _ => panic!("#[derive(Validate)] only works on `struct`s"),
    };

    let ident = &ast.ident;
    let idents: Vec<_> = fields.iter().map(|f| f.ident.as_ref().unwrap()).collect();
    let field_names: Vec<_> = idents
        .iter()
        .map(|ident| ident.to_string().to_camel_case())
        .collect();

    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let hook_call = validate_hook(ast).map(|hook| {
        quote! {
            #hook(self, _root, _path, _report);
        }
    });

    quote! {
        impl #impl_generics crate::validation::Validate
            for #ident #ty_generics #where_clause
        {
            fn validate<P, R>(
                &self,
                _root: &crate::Root,
                _path: P,
                _report: &mut R,
            ) where
                P: Fn() -> crate::Path,
                R: FnMut(&dyn Fn() -> crate::Path, crate::validation::Error),
            {
                #(
                    self.#idents.validate(
                        _root,
                        || _path().field(#field_names),
                        _report,
                    );
                )*
                #hook_call
            }
        }
    }
}
