//! Reads the endpoint metadata and the shape of every method of a service trait.

use std::sync::LazyLock;

use regex::Regex;
use syn::spanned::Spanned;
use syn::{
    Attribute, FnArg, GenericArgument, Ident, LitStr, Pat, PathArguments, ReturnType, Signature,
    TraitItemFn, Type,
};

/// Types rendered into the path rather than sent as body.
const SCALARS: &[&str] = &[
    "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
    "f32", "f64", "bool", "char", "str", "String", "Cow",
];

/// Characters allowed in an HTTP method, besides ASCII alphanumerics (RFC 9110 token).
const TOKEN_CHARS: &str = "!#$%&'*+-.^_`|~";

/// The `#[endpoint(...)]` attribute.
pub(crate) struct EndpointAttr {
    pub(crate) path: LitStr,
    pub(crate) method: LitStr,
    pub(crate) content_type: Option<LitStr>,
    pub(crate) response_content_type: Option<LitStr>,
    pub(crate) discard_errors: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamKind {
    Path,
    Body,
}

pub(crate) struct Param {
    pub(crate) ident: Ident,
    pub(crate) kind: ParamKind,
    pub(crate) position: usize,
}

/// Declared outputs of an endpoint method.
pub(crate) enum Returns {
    /// `Result<T, E>`, `payload` is `None` for `Result<(), E>`.
    Result { payload: Option<Type> },
    /// A bare payload, errors are discarded.
    Payload(Type),
    /// Nothing, errors are discarded.
    Unit,
}

/// Everything needed to generate one endpoint method.
pub(crate) struct EndpointMethod {
    pub(crate) attr: EndpointAttr,
    pub(crate) params: Vec<Param>,
    pub(crate) returns: Returns,
}

pub(crate) fn is_endpoint_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("endpoint")
}

pub(crate) fn is_param_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("body") || attr.path().is_ident("path")
}

/// Scans one trait method.
pub(crate) fn scan_method(method: &TraitItemFn) -> syn::Result<EndpointMethod> {
    let sig = &method.sig;
    let Some(attr) = method.attrs.iter().find(|attr| is_endpoint_attr(attr)) else {
        return Err(syn::Error::new(
            sig.ident.span(),
            "missing #[endpoint(path = \"...\", method = \"...\")] attribute",
        ));
    };
    if let Some(body) = &method.default {
        return Err(syn::Error::new(
            body.span(),
            "endpoint methods are generated, remove the default body",
        ));
    }
    check_signature(sig)?;

    let attr = parse_endpoint_attr(attr)?;
    let params = scan_params(sig)?;
    let returns = scan_returns(&sig.output)?;

    if !attr.discard_errors && !matches!(returns, Returns::Result { .. }) {
        return Err(syn::Error::new(
            sig.output.span(),
            "endpoint declares no error output: return `Result<_, _>` \
             or use `#[endpoint(..., discard_errors)]`",
        ));
    }
    check_placeholders(&attr.path, &params)?;

    Ok(EndpointMethod {
        attr,
        params,
        returns,
    })
}

fn check_signature(sig: &Signature) -> syn::Result<()> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(
            sig.fn_token.span(),
            "endpoint methods must be `async`",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "endpoint methods cannot be generic",
        ));
    }
    match sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => Ok(()),
        Some(receiver) => Err(syn::Error::new(
            receiver.span(),
            "endpoint methods must take `&self`",
        )),
        None => Err(syn::Error::new(
            sig.ident.span(),
            "endpoint methods must take `&self`",
        )),
    }
}

pub(crate) fn parse_endpoint_attr(attr: &Attribute) -> syn::Result<EndpointAttr> {
    let mut path = None;
    let mut method = None;
    let mut content_type = None;
    let mut response_content_type = None;
    let mut discard_errors = false;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("path") {
            path = Some(meta.value()?.parse::<LitStr>()?);
        } else if meta.path.is_ident("method") {
            method = Some(meta.value()?.parse::<LitStr>()?);
        } else if meta.path.is_ident("content_type") {
            content_type = Some(meta.value()?.parse::<LitStr>()?);
        } else if meta.path.is_ident("response_content_type") {
            response_content_type = Some(meta.value()?.parse::<LitStr>()?);
        } else if meta.path.is_ident("discard_errors") {
            discard_errors = true;
        } else {
            return Err(meta.error(
                "unsupported endpoint key, expected one of: path, method, content_type, \
                 response_content_type, discard_errors",
            ));
        }
        Ok(())
    })?;

    let Some(path) = path else {
        return Err(syn::Error::new(attr.span(), "missing `path = \"...\"`"));
    };
    let Some(method) = method else {
        return Err(syn::Error::new(attr.span(), "missing `method = \"...\"`"));
    };
    let verb = method.value();
    let valid_verb = !verb.is_empty()
        && verb
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || TOKEN_CHARS.contains(ch));
    if !valid_verb {
        return Err(syn::Error::new(
            method.span(),
            format!("invalid HTTP method '{verb}'"),
        ));
    }

    Ok(EndpointAttr {
        path,
        method,
        content_type,
        response_content_type,
        discard_errors,
    })
}

fn scan_params(sig: &Signature) -> syn::Result<Vec<Param>> {
    let mut params = Vec::new();
    let mut body: Option<&Ident> = None;

    let typed = sig.inputs.iter().filter_map(|input| match input {
        FnArg::Typed(pat_type) => Some(pat_type),
        FnArg::Receiver(_) => None,
    });
    for (position, pat_type) in typed.enumerate() {
        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return Err(syn::Error::new(
                pat_type.pat.span(),
                "endpoint parameters must be plain identifiers",
            ));
        };
        let ident = pat_ident.ident.clone();

        let forced = pat_type.attrs.iter().find_map(|attr| {
            if attr.path().is_ident("body") {
                Some(ParamKind::Body)
            } else if attr.path().is_ident("path") {
                Some(ParamKind::Path)
            } else {
                None
            }
        });
        let kind = forced.unwrap_or_else(|| classify(&pat_type.ty));

        if kind == ParamKind::Body {
            if let Some(first) = body {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("only one body parameter is supported, `{first}` is already the body"),
                ));
            }
            body = Some(&pat_ident.ident);
        }

        params.push(Param {
            ident,
            kind,
            position,
        });
    }

    Ok(params)
}

/// Scalar types go to the path, everything else is a structured body.
pub(crate) fn classify(ty: &Type) -> ParamKind {
    match ty {
        Type::Reference(reference) => classify(&reference.elem),
        Type::Paren(paren) => classify(&paren.elem),
        Type::Group(group) => classify(&group.elem),
        Type::Path(type_path) if type_path.qself.is_none() => {
            let is_scalar = type_path
                .path
                .segments
                .last()
                .is_some_and(|segment| SCALARS.contains(&segment.ident.to_string().as_str()));
            if is_scalar {
                ParamKind::Path
            } else {
                ParamKind::Body
            }
        }
        _ => ParamKind::Body,
    }
}

pub(crate) fn scan_returns(output: &ReturnType) -> syn::Result<Returns> {
    let ty = match output {
        ReturnType::Default => return Ok(Returns::Unit),
        ReturnType::Type(_, ty) => ty.as_ref(),
    };

    match ty {
        Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(Returns::Unit),
        Type::Tuple(tuple) if tuple.elems.len() > 1 => Err(syn::Error::new(
            tuple.span(),
            "at most one payload output is supported, return a single type",
        )),
        Type::Path(type_path) if type_path.qself.is_none() => {
            let Some(last) = type_path.path.segments.last() else {
                return Ok(Returns::Payload(ty.clone()));
            };
            if last.ident != "Result" {
                return Ok(Returns::Payload(ty.clone()));
            }
            let PathArguments::AngleBracketed(args) = &last.arguments else {
                return Err(syn::Error::new(
                    last.span(),
                    "`Result` needs its payload type",
                ));
            };
            let mut types = args.args.iter().filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            });
            let Some(payload) = types.next() else {
                return Err(syn::Error::new(
                    args.span(),
                    "`Result` needs its payload type",
                ));
            };
            let payload = match payload {
                Type::Tuple(tuple) if tuple.elems.is_empty() => None,
                other => Some(other.clone()),
            };
            Ok(Returns::Result { payload })
        }
        other => Ok(Returns::Payload(other.clone())),
    }
}

/// Any brace-delimited token of a path template.
///
/// Wider than the runtime placeholder `\{\d+}`: a non-numeric token such as `{id}`
/// would be sent verbatim, so it is reported at compile time.
static BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<token>[^{}]*)}").expect("a valid regex"));

/// Positions referenced by `{n}` tokens of a path template, in order of appearance.
pub(crate) fn placeholders(template: &str) -> Vec<Result<usize, String>> {
    BRACED
        .captures_iter(template)
        .filter_map(|caps| caps.name("token"))
        .map(|token| {
            token
                .as_str()
                .parse::<usize>()
                .map_err(|_| token.as_str().to_string())
        })
        .collect()
}

fn check_placeholders(path: &LitStr, params: &[Param]) -> syn::Result<()> {
    let template = path.value();
    let mut used = Vec::new();

    for placeholder in placeholders(&template) {
        let position = placeholder.map_err(|token| {
            syn::Error::new(
                path.span(),
                format!("placeholder `{{{token}}}` must be a parameter position like `{{0}}`"),
            )
        })?;
        let param = params.iter().find(|param| param.position == position);
        match param {
            Some(param) if param.kind == ParamKind::Path => used.push(position),
            Some(param) => {
                return Err(syn::Error::new(
                    path.span(),
                    format!(
                        "placeholder `{{{position}}}` refers to `{}` which is the body",
                        param.ident
                    ),
                ));
            }
            None => {
                return Err(syn::Error::new(
                    path.span(),
                    format!("placeholder `{{{position}}}` has no matching parameter"),
                ));
            }
        }
    }

    let unused = params
        .iter()
        .find(|param| param.kind == ParamKind::Path && !used.contains(&param.position));
    if let Some(param) = unused {
        return Err(syn::Error::new(
            param.ident.span(),
            format!(
                "`{}` is not used by the path template, add `{{{}}}` to the path",
                param.ident, param.position
            ),
        ));
    }

    Ok(())
}
