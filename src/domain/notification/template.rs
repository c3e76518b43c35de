//! `{{placeholder}}` substitution for bulk email bodies.

use std::collections::HashMap;

/// Replaces every `{{ key }}` with `vars[key]`. Keys are trimmed. Unknown keys
/// render as the empty string. An unterminated `{{` is copied verbatim.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    substitute(template, vars, |value| value.to_string())
}

/// Like [`render`], for an HTML body: substituted values are escaped, the
/// template itself is trusted markup.
pub fn render_html(template: &str, vars: &HashMap<String, String>) -> String {
    substitute(template, vars, html_escape)
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn substitute(
    template: &str,
    vars: &HashMap<String, String>,
    encode: impl Fn(&str) -> String,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let key = after_open[..end].trim();
                if let Some(value) = vars.get(key) {
                    out.push_str(&encode(value));
                }
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_placeholders() {
        let out = render(
            "Dear {{name}}, your address is {{ email }}.",
            &vars(&[("name", "Ada"), ("email", "ada@example.org")]),
        );
        assert_eq!(out, "Dear Ada, your address is ada@example.org.");
    }

    #[test]
    fn unresolved_placeholders_become_empty() {
        assert_eq!(render("Hi {{name}}{{missing}}!", &vars(&[("name", "Bo")])), "Hi Bo!");
    }

    #[test]
    fn unterminated_placeholder_is_left_alone() {
        assert_eq!(render("Price: {{amount", &vars(&[])), "Price: {{amount");
    }

    #[test]
    fn values_are_not_re_expanded() {
        let out = render("{{a}}", &vars(&[("a", "{{b}}"), ("b", "x")]));
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn html_rendering_escapes_values_but_not_markup() {
        let out = render_html(
            "<p>Dear {{name}},</p>",
            &vars(&[("name", "<img src=x onerror=alert(1)> & \"co\"")]),
        );
        assert_eq!(
            out,
            "<p>Dear &lt;img src=x onerror=alert(1)&gt; &amp; &quot;co&quot;,</p>"
        );
    }

    proptest! {
        #[test]
        fn text_without_braces_is_unchanged(s in "[^{}]*") {
            prop_assert_eq!(render(&s, &vars(&[("name", "x")])), s);
        }

        #[test]
        fn output_never_contains_closed_placeholders(
            prefix in "[a-z ]{0,10}",
            key in "[a-z]{1,8}",
            suffix in "[a-z ]{0,10}",
        ) {
            let template = format!("{}{{{{{}}}}}{}", prefix, key, suffix);
            let out = render(&template, &HashMap::new());
            prop_assert_eq!(out, format!("{}{}", prefix, suffix));
        }

        #[test]
        fn known_key_is_always_substituted(key in "[a-z]{1,8}", value in "[A-Za-z0-9 ]{0,12}") {
            let template = format!("<{{{{ {} }}}}>", key);
            let out = render(&template, &vars(&[(key.as_str(), value.as_str())]));
            prop_assert_eq!(out, format!("<{}>", value));
        }
    }
}
