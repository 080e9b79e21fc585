use crate::vocab::{rdf, xsd};
use crate::TermCoercionError;
use oxrdf::{Literal, NamedNode, NamedNodeRef};
use oxsdatatypes::{Boolean, Date, DateTime, Decimal, Double, Float, Integer, Time};
use std::fmt::Display;
use std::str::FromStr;

/// Parses `value` as an IRI.
pub fn coerce_iri(value: &str) -> Result<NamedNode, TermCoercionError> {
    NamedNode::new(value).map_err(|err| TermCoercionError::new(value, "IRI", err.to_string()))
}

/// Creates a literal of `datatype` from the lexical `value`.
///
/// Values of the XSD numeric, boolean and temporal types are validated and rewritten into their
/// canonical lexical form. The derived integer types are checked against their value range. Any other datatype is taken verbatim. `xsd:string` and
/// `rdf:langString` produce a simple literal.
pub fn coerce_typed_literal(
    value: &str,
    datatype: NamedNodeRef<'_>,
) -> Result<Literal, TermCoercionError> {
    if datatype == xsd::STRING || datatype == rdf::LANG_STRING {
        return Ok(Literal::new_simple_literal(value));
    }

    let canonical = if datatype == xsd::INTEGER
        || datatype == xsd::INT
        || datatype == xsd::LONG
        || datatype == xsd::SHORT
        || datatype == xsd::NON_NEGATIVE_INTEGER
    {
        Some(canonical_form::<Integer>(value).and_then(|lexical| bounded(lexical, datatype)))
    } else if datatype == xsd::DECIMAL {
        Some(canonical_form::<Decimal>(value))
    } else if datatype == xsd::DOUBLE {
        Some(canonical_form::<Double>(value))
    } else if datatype == xsd::FLOAT {
        Some(canonical_form::<Float>(value))
    } else if datatype == xsd::BOOLEAN {
        Some(canonical_form::<Boolean>(value))
    } else if datatype == xsd::DATE {
        Some(canonical_form::<Date>(value))
    } else if datatype == xsd::DATE_TIME {
        Some(canonical_form::<DateTime>(value))
    } else if datatype == xsd::TIME {
        Some(canonical_form::<Time>(value))
    } else {
        None
    };

    let lexical = match canonical {
        Some(Ok(lexical)) => lexical,
        Some(Err(reason)) => {
            return Err(TermCoercionError::for_datatype(
                value,
                &datatype.into_owned(),
                reason,
            ))
        }
        None => value.to_owned(),
    };
    Ok(Literal::new_typed_literal(lexical, datatype))
}

/// Validates a language range as used by `langMatches`.
///
/// The wildcard `*` is accepted next to well-formed BCP47 tags.
pub fn coerce_language_range(value: &str) -> Result<Literal, TermCoercionError> {
    if value != "*" {
        Literal::new_language_tagged_literal("", value)
            .map_err(|err| TermCoercionError::new(value, "language tag", err.to_string()))?;
    }
    Ok(Literal::new_simple_literal(value))
}

fn canonical_form<T>(value: &str) -> Result<String, String>
where
    T: FromStr + Display,
    T::Err: Display,
{
    value
        .trim()
        .parse::<T>()
        .map(|parsed| parsed.to_string())
        .map_err(|err| err.to_string())
}

/// Checks the canonical form of an integer against the range of the derived `datatype`.
fn bounded(lexical: String, datatype: NamedNodeRef<'_>) -> Result<String, String> {
    let in_range = if datatype == xsd::INT {
        lexical.parse::<i32>().is_ok()
    } else if datatype == xsd::SHORT {
        lexical.parse::<i16>().is_ok()
    } else if datatype == xsd::NON_NEGATIVE_INTEGER {
        !lexical.starts_with('-')
    } else {
        true
    };
    if in_range {
        Ok(lexical)
    } else {
        Err(format!("{lexical} is out of range"))
    }
}
