use super::ProviderError;
use std::collections::HashMap;

/// Replace `{{.name}}` placeholders in `template` with values from `substitutions`.
///
/// Whitespace inside the braces is ignored (`{{ .workspace }}`). A
/// placeholder without a matching key is an error; an unterminated `{{`
/// is copied through verbatim.
pub fn substitute(
    template: &str,
    substitutions: &HashMap<String, String>,
) -> Result<String, ProviderError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };

        out.push_str(&rest[..start]);

        let inner = rest[start + 2..start + 2 + len].trim();
        let name = inner.strip_prefix('.').unwrap_or(inner);
        let value = substitutions
            .get(name)
            .ok_or_else(|| ProviderError::MissingSubstitution(name.to_string()))?;
        out.push_str(value);

        rest = &rest[start + 2 + len + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_placeholders() {
        let result = substitute("https://api.gong.io", &HashMap::new()).unwrap();
        assert_eq!(result, "https://api.gong.io");
    }

    #[test]
    fn test_single_placeholder() {
        let result = substitute(
            "https://{{.workspace}}.my.salesforce.com",
            &subs(&[("workspace", "acme")]),
        )
        .unwrap();
        assert_eq!(result, "https://acme.my.salesforce.com");
    }

    #[test]
    fn test_multiple_and_spaced_placeholders() {
        let result = substitute(
            "https://{{ .workspace }}.example.com/{{.region}}/x",
            &subs(&[("workspace", "acme"), ("region", "eu")]),
        )
        .unwrap();
        assert_eq!(result, "https://acme.example.com/eu/x");
    }

    #[test]
    fn test_missing_substitution() {
        let err = substitute("https://{{.workspace}}.example.com", &HashMap::new()).unwrap_err();
        assert_eq!(err, ProviderError::MissingSubstitution("workspace".to_string()));
    }

    #[test]
    fn test_unterminated_placeholder_is_literal() {
        let result = substitute("https://{{.workspace.example.com", &HashMap::new()).unwrap();
        assert_eq!(result, "https://{{.workspace.example.com");
    }
}
