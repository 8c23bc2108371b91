//! Resolution of symbolic result identifiers into concrete channel names.
//!
//! Accepted identifier forms, mirroring the job-configuration schema:
//! - a literal channel name string, used as-is;
//! - a structured mapping with a `symbol` (`RF1`, `U2`, `S11`, `LE11`,
//!   `SDV3`, ...) and optional `position` and `nset`/`elset` qualifiers;
//! - a sequence of identifiers for x-y and multi-channel tests.
//!
//! Node symbols without a `position` are resolved by scanning the step's
//! regions for exactly one `Node ...` region exposing the symbol.

use crate::domain::{EvalResult, VerifyError};
use crate::history::HistoryStore;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Literal(String),
    Structured(StructuredIdentifier),
    Sequence(Vec<Identifier>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredIdentifier {
    pub symbol: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub nset: Option<String>,
    #[serde(default)]
    pub elset: Option<String>,
    /// Label referenced by series expressions; unused for positional access.
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolKind {
    ReactionForce,
    Displacement,
    Stress,
    LogStrain,
    StateVariable,
}

impl SymbolKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::ReactionForce => "Reaction force: ",
            Self::Displacement => "Spatial displacement: ",
            Self::Stress => "Stress components: ",
            Self::LogStrain => "Logarithmic strain components: ",
            Self::StateVariable => "Solution dependent state variables: ",
        }
    }

    const fn is_node_kind(self) -> bool {
        matches!(self, Self::ReactionForce | Self::Displacement)
    }
}

fn classify_symbol(symbol: &str) -> EvalResult<SymbolKind> {
    if matches_prefix_digits(symbol, "RF", 1) {
        return Ok(SymbolKind::ReactionForce);
    }
    if matches_prefix_digits(symbol, "U", 1) {
        return Ok(SymbolKind::Displacement);
    }
    // SDV before S: "SDV3" also starts with 'S'
    if symbol.len() > 3 && symbol.starts_with("SDV") {
        return Ok(SymbolKind::StateVariable);
    }
    if matches_prefix_digits(symbol, "LE", 1) {
        return Ok(SymbolKind::LogStrain);
    }
    if matches_prefix_digits(symbol, "S", 1) {
        return Ok(SymbolKind::Stress);
    }
    if matches_prefix_digits(symbol, "E", 1) {
        return Err(VerifyError::unsupported_identifier(
            "IDENT.TOTAL_STRAIN",
            format!("total strain symbol '{symbol}' is not supported"),
        ));
    }
    Err(VerifyError::unsupported_identifier(
        "IDENT.SYMBOL",
        format!("unrecognized symbol '{symbol}'"),
    ))
}

fn matches_prefix_digits(symbol: &str, prefix: &str, min_digits: usize) -> bool {
    let Some(rest) = symbol.strip_prefix(prefix) else {
        return false;
    };
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    digits >= min_digits
}

/// Resolves one identifier to its channel name. Sequences are rejected here;
/// multi-channel tests resolve through [`resolve_channel_names`].
pub fn resolve_channel_name(
    identifier: &Identifier,
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<String> {
    match identifier {
        Identifier::Literal(name) => Ok(name.clone()),
        Identifier::Structured(structured) => resolve_structured(structured, steps, store),
        Identifier::Sequence(_) => Err(VerifyError::malformed_identifier(
            "IDENT.SEQUENCE",
            "expected a single identifier, found a sequence",
        )),
    }
}

/// Resolves a sequence of identifiers to channel names, preserving order.
pub fn resolve_channel_names(
    identifiers: &[Identifier],
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<Vec<String>> {
    identifiers
        .iter()
        .map(|identifier| resolve_channel_name(identifier, steps, store))
        .collect()
}

fn resolve_structured(
    identifier: &StructuredIdentifier,
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<String> {
    if identifier.symbol.is_empty() {
        return Err(VerifyError::malformed_identifier(
            "IDENT.SYMBOL",
            "identifier is missing its symbol definition",
        ));
    }

    let kind = classify_symbol(&identifier.symbol)?;
    if kind.is_node_kind() {
        node_channel_name(kind, identifier, steps, store)
    } else {
        element_channel_name(kind, identifier, store)
    }
}

fn node_channel_name(
    kind: SymbolKind,
    identifier: &StructuredIdentifier,
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<String> {
    let symbol = &identifier.symbol;
    let nset = identifier.nset.as_deref().ok_or_else(|| {
        VerifyError::malformed_identifier(
            "IDENT.NSET",
            format!("identifier '{symbol}' requires an nset qualifier"),
        )
    })?;

    if let Some(position) = &identifier.position {
        return Ok(format!(
            "{}{symbol} at {position} in NSET {nset}",
            kind.prefix()
        ));
    }

    if steps.len() != 1 {
        return Err(VerifyError::unresolved_identifier(
            "IDENT.SCAN_SCOPE",
            format!("identifier '{symbol}' requires a position when the analysis has multiple steps"),
        ));
    }

    let mut node_labels: Vec<String> = Vec::new();
    for region_label in store.regions_with_symbol(&steps[0], symbol)? {
        if let Some(node) = node_number_from_region_label(&region_label) {
            node_labels.push(node);
        }
    }

    match node_labels.as_slice() {
        [node] => Ok(format!(
            "{}{symbol} at Node {node} in NSET {nset}",
            kind.prefix()
        )),
        [] => Err(VerifyError::unresolved_identifier(
            "IDENT.SCAN_EMPTY",
            format!(
                "no node region exposing '{symbol}' found in step '{}'",
                steps[0]
            ),
        )),
        _ => Err(VerifyError::unresolved_identifier(
            "IDENT.SCAN_AMBIGUOUS",
            format!(
                "{} node regions expose '{symbol}' in step '{}'; specify a position",
                node_labels.len(),
                steps[0]
            ),
        )),
    }
}

/// Region labels look like `Node 9` or `Node PART-1-1.9`; the node number is
/// the trailing dot-component.
fn node_number_from_region_label(label: &str) -> Option<String> {
    let mut parts = label.split_whitespace();
    if parts.next()? != "Node" {
        return None;
    }
    let instance = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let node = instance.rsplit('.').next().unwrap_or(instance);
    (!node.is_empty()).then(|| node.to_string())
}

fn element_channel_name(
    kind: SymbolKind,
    identifier: &StructuredIdentifier,
    store: &dyn HistoryStore,
) -> EvalResult<String> {
    let elset = identifier.elset.as_deref().ok_or_else(|| {
        VerifyError::malformed_identifier(
            "IDENT.ELSET",
            format!(
                "identifier '{}' requires an elset qualifier",
                identifier.symbol
            ),
        )
    })?;
    let position = identifier.position.as_deref().ok_or_else(|| {
        VerifyError::malformed_identifier(
            "IDENT.POSITION",
            format!(
                "identifier '{}' requires a position qualifier",
                identifier.symbol
            ),
        )
    })?;

    // The run may record the symbol with different casing (sdv_alpha vs
    // SDV_ALPHA); fall back to a case-insensitive match against known symbols.
    let mut symbol = identifier.symbol.clone();
    let known = store.all_symbols();
    if !known.iter().any(|candidate| *candidate == symbol)
        && let Some(matched) = known
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(&symbol))
    {
        symbol = matched.clone();
    }

    Ok(format!(
        "{}{symbol} at {position} in ELSET {elset}",
        kind.prefix()
    ))
}
