//! Code generation for `#[service]`.
//!
//! 1) scan every method of the trait (endpoint metadata, parameters, outputs)
//! 2) rewrite the trait: strip the custom attributes, turn `async fn` into `fn -> impl Future + Send`
//! 3) generate the `XxxClient` struct wrapping a `snooze_core::Client`
//! 4) implement the trait with one call per endpoint

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{FnArg, ItemTrait, ReturnType, Signature, TraitItem, parse_quote};

use crate::scan::{
    EndpointMethod, ParamKind, Returns, is_endpoint_attr, is_param_attr, scan_method,
};

pub(crate) fn expand_service(attr: TokenStream, item: TokenStream) -> TokenStream {
    match try_expand_service(attr, item) {
        Ok(tokens) => tokens,
        Err(error) => error.to_compile_error(),
    }
}

fn try_expand_service(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    if !attr.is_empty() {
        return Err(syn::Error::new(
            attr.span(),
            "#[service] does not take arguments",
        ));
    }
    let mut trait_item: ItemTrait = syn::parse2(item)?;
    if !trait_item.generics.params.is_empty() {
        return Err(syn::Error::new(
            trait_item.generics.span(),
            "service traits cannot be generic",
        ));
    }

    let mut errors: Option<syn::Error> = None;
    let mut method_impls = Vec::new();
    for item in &mut trait_item.items {
        let method = match item {
            TraitItem::Fn(method) => method,
            other => {
                push_error(
                    &mut errors,
                    syn::Error::new(other.span(), "service traits only contain endpoint methods"),
                );
                continue;
            }
        };
        match scan_method(method) {
            Ok(endpoint) => {
                strip_custom_attrs(method);
                method.sig = future_signature(&method.sig);
                method_impls.push(expand_method(&method.sig, &endpoint));
            }
            Err(error) => push_error(&mut errors, error),
        }
    }
    if let Some(errors) = errors {
        return Err(errors);
    }

    let vis = &trait_item.vis;
    let trait_ident = &trait_item.ident;
    let client_ident = format_ident!("{}Client", trait_ident);
    let client_doc = format!("Client for [`{trait_ident}`], generated by `#[service]`.");

    Ok(quote! {
        #trait_item

        #[doc = #client_doc]
        #[derive(Debug, Clone)]
        #vis struct #client_ident {
            client: ::snooze_core::Client,
        }

        impl #client_ident {
            /// Creates the service client on top of `client`.
            #vis fn new(client: ::snooze_core::Client) -> Self {
                Self { client }
            }

            /// The underlying client.
            #vis fn client(&self) -> &::snooze_core::Client {
                &self.client
            }
        }

        impl ::core::convert::From<::snooze_core::Client> for #client_ident {
            fn from(client: ::snooze_core::Client) -> Self {
                Self::new(client)
            }
        }

        impl #trait_ident for #client_ident {
            #(#method_impls)*
        }
    })
}

fn push_error(errors: &mut Option<syn::Error>, error: syn::Error) {
    match errors {
        Some(errors) => errors.combine(error),
        None => *errors = Some(error),
    }
}

fn strip_custom_attrs(method: &mut syn::TraitItemFn) {
    method.attrs.retain(|attr| !is_endpoint_attr(attr));
    for input in &mut method.sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            pat_type.attrs.retain(|attr| !is_param_attr(attr));
        }
    }
}

/// `async fn f(..) -> R` becomes `fn f(..) -> impl Future<Output = R> + Send`.
fn future_signature(sig: &Signature) -> Signature {
    let output = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };
    let mut sig = sig.clone();
    sig.asyncness = None;
    sig.output = parse_quote! {
        -> impl ::core::future::Future<Output = #output> + ::core::marker::Send
    };
    sig
}

fn expand_method(sig: &Signature, endpoint: &EndpointMethod) -> TokenStream {
    let EndpointMethod {
        attr,
        params,
        returns,
    } = endpoint;

    let path = &attr.path;
    let method = &attr.method;
    let mut endpoint_tokens = quote! { ::snooze_core::Endpoint::new(#path, #method) };
    if let Some(content_type) = &attr.content_type {
        endpoint_tokens = quote! { #endpoint_tokens.with_content_type(#content_type) };
    }
    if let Some(content_type) = &attr.response_content_type {
        endpoint_tokens = quote! { #endpoint_tokens.with_response_content_type(#content_type) };
    }

    let (shape, payload, conversion) = match returns {
        Returns::Result { payload: Some(ty) } => (
            quote! { PAYLOAD_AND_ERROR },
            quote! { #ty },
            quote! { into_result },
        ),
        Returns::Result { payload: None } => {
            (quote! { ERROR_ONLY }, quote! { () }, quote! { into_result })
        }
        Returns::Payload(ty) => (
            quote! { PAYLOAD_ONLY },
            quote! { #ty },
            quote! { into_payload },
        ),
        Returns::Unit => (quote! { EMPTY }, quote! { () }, quote! { into_payload }),
    };

    let mut arguments = match params.iter().find(|param| param.kind == ParamKind::Body) {
        Some(body) => {
            let ident = &body.ident;
            quote! { ::snooze_core::Arguments::with_body(&#ident) }
        }
        None => quote! { ::snooze_core::Arguments::without_body() },
    };
    for param in params.iter().filter(|param| param.kind == ParamKind::Path) {
        let ident = &param.ident;
        let position = param.position;
        arguments = quote! { #arguments.path(#position, &#ident) };
    }

    quote! {
        #sig {
            const STUB: ::snooze_core::Stub = ::snooze_core::Stub::new(
                #endpoint_tokens,
                ::snooze_core::ResultShape::#shape,
            );
            async move {
                let arguments = #arguments;
                self.client
                    .call::<_, #payload>(&STUB, arguments)
                    .await
                    .#conversion()
            }
        }
    }
}
