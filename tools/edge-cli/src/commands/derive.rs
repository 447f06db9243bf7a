//! Derive a cache key from a configured rule and a simulated request.

use anyhow::{bail, Result};
use edge_cache::{CacheKeyContext, CacheKeyHeaders, DeviceType, GeoContext};
use serde::Serialize;

use super::{parse_pair, DeriveArgs};
use crate::context::Context;
use crate::output::styled_key;

#[derive(Serialize)]
struct DeriveOutput<'a> {
    rule: &'a str,
    key: &'a str,
    inputs: Vec<Input<'a>>,
    has_sentinel: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    headers: Vec<(String, String)>,
}

#[derive(Serialize)]
struct Input<'a> {
    field: String,
    value: &'a str,
}

/// Build the request context described by the arguments.
fn request_context(args: &DeriveArgs) -> Result<CacheKeyContext> {
    let mut ctx = CacheKeyContext::new(&args.method, &args.path);

    for header in &args.headers {
        let (name, value) = parse_pair(header)?;
        ctx = ctx.with_header(name, value);
    }
    for query in &args.queries {
        let (name, value) = parse_pair(query)?;
        ctx = ctx.with_query(name, value);
    }
    for cookie in &args.cookies {
        let (name, value) = parse_pair(cookie)?;
        ctx = ctx.with_cookie(name, value);
    }
    if let Some(user) = &args.user {
        ctx = ctx.with_user_id(user);
    }
    if args.country.is_some() || args.region.is_some() || args.city.is_some() {
        ctx = ctx.with_geo(GeoContext {
            country: args.country.clone(),
            region: args.region.clone(),
            city: args.city.clone(),
        });
    }
    if let Some(device) = ctx.header("user-agent").map(DeviceType::from_user_agent) {
        ctx = ctx.with_device_type(device);
    }

    Ok(ctx)
}

/// Run the derive command.
pub async fn run(args: DeriveArgs, ctx: &Context) -> Result<()> {
    let rules = ctx.rule_set()?;
    let Some(rule) = rules.get(&args.rule) else {
        let known: Vec<&str> = rules.iter().map(|r| r.name()).collect();
        bail!("Unknown rule `{}` (configured: {})", args.rule, known.join(", "));
    };

    let request = request_context(&args)?;
    let key = rule.derive(&request);

    let headers = if args.debug_headers || request.wants_debug_headers() {
        CacheKeyHeaders::from_key(&key).to_headers()
    } else {
        Vec::new()
    };

    if ctx.output.is_json() {
        ctx.output.json(&DeriveOutput {
            rule: rule.name(),
            key: key.as_str(),
            inputs: rule
                .inputs()
                .iter()
                .zip(key.components())
                .map(|(field, value)| Input {
                    field: field.to_string(),
                    value,
                })
                .collect(),
            has_sentinel: key.has_sentinel(),
            headers,
        });
        return Ok(());
    }

    println!("{}", styled_key(key.as_str(), key.has_sentinel()));

    if ctx.output.is_verbose() {
        ctx.output.header("Inputs");
        for (i, (field, value)) in rule.inputs().iter().zip(key.components()).enumerate() {
            ctx.output.kv(&format!("{{{}}} {}", i, field), value);
        }
    }

    for (name, value) in &headers {
        ctx.output.kv(name, value);
    }

    if key.has_sentinel() {
        ctx.output.warn("Key contains a sentinel; run `edge check` for details");
    }

    Ok(())
}
