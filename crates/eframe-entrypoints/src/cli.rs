//! Command line parsing shared by every platform.
//!
//! Native builds read `std::env::args()`. Web builds have no command line, so
//! the page URL stands in for it: `?cliZoom=7&cliMapStyle=open-topo-map`
//! becomes `--zoom 7 --map-style open-topo-map` and `?envLOG_LEVEL=debug`
//! sets a pseudo environment variable readable through [`get_env`].

use clap::Parser;
#[cfg(target_arch = "wasm32")]
use clap::CommandFactory;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static ENV_MAP: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
}

/// Read an environment variable and parse it to the desired type.
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    #[cfg(target_arch = "wasm32")]
    {
        ENV_MAP.with(|map| map.borrow().get(key).and_then(|s| s.parse().ok()))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::var(key).ok().and_then(|s| s.parse().ok())
    }
}

/// Arguments and variables extracted from a URL query string
#[derive(Debug, Default, PartialEq, Eq)]
pub struct QueryArgs {
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

/// Translate a URL query string into command line arguments.
///
/// `cli<Name>` keys become `--<kebab-name>` flags followed by their value, if
/// any. `env<NAME>` keys become variables. Other keys are ignored.
pub fn query_to_args(query: &str) -> QueryArgs {
    let mut parsed = QueryArgs::default();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = value.into_owned();
        if let Some(flag) = key.strip_prefix("cli").filter(|flag| !flag.is_empty()) {
            parsed.args.push(format!("--{}", to_kebab_case(flag)));
            if !value.is_empty() {
                parsed.args.push(value);
            }
        } else if let Some(name) = key.strip_prefix("env").filter(|name| !name.is_empty()) {
            parsed.env.insert(name.to_string(), value);
        }
    }

    parsed
}

/// Parse from the command line arguments on native and from GET parameters on web.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        let QueryArgs { args, env } = query_to_args(query_of(&page_href()));
        ENV_MAP.with(|map| map.borrow_mut().extend(env));

        let program = T::command().get_name().to_string();
        T::try_parse_from(std::iter::once(program).chain(args))
    }
}

/// Load the `env*` URL parameters into [`get_env`] without parsing any flags
#[cfg(target_arch = "wasm32")]
pub fn load_url_env() {
    let QueryArgs { env, .. } = query_to_args(query_of(&page_href()));
    ENV_MAP.with(|map| map.borrow_mut().extend(env));
}

#[cfg(target_arch = "wasm32")]
fn page_href() -> String {
    web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default()
}

/// Query part of `href`, without the fragment
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn query_of(href: &str) -> &str {
    href.split_once('?')
        .map(|(_, query)| query.split('#').next().unwrap_or_default())
        .unwrap_or_default()
}

fn to_kebab_case(flag: &str) -> String {
    let mut out = String::with_capacity(flag.len() + 4);
    for (i, c) in flag.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_flags_and_values() {
        let parsed = query_to_args("cliZoom=7&cliMapStyle=open-topo-map&cliIgnorePersisted");
        assert_eq!(
            parsed.args,
            vec![
                "--zoom",
                "7",
                "--map-style",
                "open-topo-map",
                "--ignore-persisted"
            ]
        );
        assert!(parsed.env.is_empty());
    }

    #[test]
    fn test_query_env_and_unknown_keys() {
        let parsed = query_to_args("envLOG_LEVEL=debug&utm_source=x&cli=1&");
        assert!(parsed.args.is_empty());
        assert_eq!(parsed.env.get("LOG_LEVEL").map(String::as_str), Some("debug"));
    }

    #[test]
    fn test_percent_decoding() {
        let parsed = query_to_args("cliUserAgent=route%20builder+test%2F1");
        assert_eq!(parsed.args, vec!["--user-agent", "route builder test/1"]);

        let parsed = query_to_args("cliGeocoderUrl=bad%zz%4");
        assert_eq!(parsed.args, vec!["--geocoder-url", "bad%zz%4"]);
    }

    #[test]
    fn test_query_of_href() {
        assert_eq!(query_of("https://x.org/app/?cliZoom=7#map"), "cliZoom=7");
        assert_eq!(query_of("https://x.org/app/?envLOG_LEVEL=debug"), "envLOG_LEVEL=debug");
        assert_eq!(query_of("https://x.org/app/#?cliZoom=7"), "");
        assert_eq!(query_of("https://x.org/app/"), "");
    }

    #[test]
    fn test_env_params_do_not_need_known_flags() {
        let parsed = query_to_args("cliNoSuchFlag=1&envLOG_LEVEL=warn");
        assert_eq!(parsed.env.get("LOG_LEVEL").map(String::as_str), Some("warn"));
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("CenterLat"), "center-lat");
        assert_eq!(to_kebab_case("center_lat"), "center-lat");
        assert_eq!(to_kebab_case("zoom"), "zoom");
    }
}
