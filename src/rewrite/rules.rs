//! Individual rewrite rules.
//!
//! Each rule is a pure function of the document text and the job context.
//! Every rule is idempotent: applying it to its own output changes nothing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};

use crate::domain::{ImagePaths, Profile};

/// Domain used in notebooks that must not appear in published docs.
pub const PRIVATE_DOMAIN: &str = "wallaroocommunity.ninja";
/// Public stand-in for [`PRIVATE_DOMAIN`].
pub const PUBLIC_DOMAIN: &str = "wallarooexample.ai";

pub const PRIVATE_EMAIL: &str = "gib.bhojraj@wallaroo.ai";
pub const EMAIL_PLACEHOLDER: &str = "sample.user@wallaroo.ai";

pub const PRIVATE_REGISTRY_URL: &str = "https://adb-5939996465837398.18.azuredatabricks.net";
pub const REGISTRY_URL_PLACEHOLDER: &str = "https://sample.registry.service.azuredatabricks.net";

/// Replacement for embedded edge bundle values.
pub const CREDENTIAL_PLACEHOLDER: &str = "'EDGE_BUNDLE': 'abcde'";

const ASSAY_IMAGE: &str = "\"images/housepricesaga-sample-assay.png\"";
const ASSAY_IMAGE_PUBLISHED: &str = "\"/images/housepricesaga-sample-assay.png\"";

const TABLE_SHORTCODE_OPEN: &str = r#"{{<table "table table-striped table-bordered" >}}"#;
const TABLE_SHORTCODE_CLOSE: &str = "{{</table>}}";

static TABLE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\{\{<table "[^"]*" >\}\}\r?\n)?<table\b[^>]*>"#).expect("valid regex")
});
static TABLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</table>(\r?\n\{\{</table>\}\})?").expect("valid regex"));
static DIV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<div.*?>|</div>").expect("valid regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<style.*?>.*?</style>").expect("valid regex"));
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("valid regex"));
static CREDENTIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'EDGE_BUNDLE': '[^'\n]*'").expect("valid regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n){3,}").expect("valid regex"));
static TAG_INDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ +<").expect("valid regex"));

/// Per-job values some rules need.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Site release tag, e.g. `2024.1`.
    pub version: &'a str,
    /// Job output directory, normalized (no leading or trailing slash).
    pub output_dir: &'a str,
    pub image_paths: ImagePaths,
    pub figure_width: u32,
}

/// A named rewrite rule.
///
/// [`Rule::ALL`] lists every rule in application order. Later rules rely on
/// earlier ones: tables are wrapped before any tag stripping, image paths are
/// made absolute before images become figure shortcodes, and whitespace is
/// normalized last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    WrapTables,
    StripDivs,
    StripStyles,
    PublicDomain,
    ImagePaths,
    FigureShortcodes,
    AssayImage,
    RedactEmail,
    RedactHostname,
    RedactCredentials,
    CollapseBlankLines,
    TrimTagIndent,
}

impl Rule {
    pub const ALL: [Rule; 12] = [
        Rule::WrapTables,
        Rule::StripDivs,
        Rule::StripStyles,
        Rule::PublicDomain,
        Rule::ImagePaths,
        Rule::FigureShortcodes,
        Rule::AssayImage,
        Rule::RedactEmail,
        Rule::RedactHostname,
        Rule::RedactCredentials,
        Rule::CollapseBlankLines,
        Rule::TrimTagIndent,
    ];

    /// Stable identifier used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::WrapTables => "wrap-tables",
            Rule::StripDivs => "strip-divs",
            Rule::StripStyles => "strip-styles",
            Rule::PublicDomain => "public-domain",
            Rule::ImagePaths => "image-paths",
            Rule::FigureShortcodes => "figure-shortcodes",
            Rule::AssayImage => "assay-image",
            Rule::RedactEmail => "redact-email",
            Rule::RedactHostname => "redact-hostname",
            Rule::RedactCredentials => "redact-credentials",
            Rule::CollapseBlankLines => "collapse-blank-lines",
            Rule::TrimTagIndent => "trim-tag-indent",
        }
    }

    /// Whether the rule is part of the given profile.
    pub fn enabled_in(&self, profile: Profile) -> bool {
        match self {
            Rule::WrapTables => profile.wraps_tables(),
            Rule::RedactHostname | Rule::RedactCredentials => profile.redacts_secrets(),
            _ => true,
        }
    }

    /// Applies the rule. Returns borrowed text when nothing matched.
    pub fn apply<'a>(&self, doc: &'a str, ctx: &RuleContext<'_>) -> Cow<'a, str> {
        match self {
            Rule::WrapTables => wrap_tables(doc),
            Rule::StripDivs => DIV_RE.replace_all(doc, ""),
            Rule::StripStyles => STYLE_RE.replace_all(doc, ""),
            Rule::PublicDomain => replace_literal(doc, PRIVATE_DOMAIN, PUBLIC_DOMAIN),
            Rule::ImagePaths => rewrite_image_paths(doc, ctx),
            Rule::FigureShortcodes => figure_shortcodes(doc, ctx.figure_width),
            Rule::AssayImage => replace_literal(doc, ASSAY_IMAGE, ASSAY_IMAGE_PUBLISHED),
            Rule::RedactEmail => replace_literal(doc, PRIVATE_EMAIL, EMAIL_PLACEHOLDER),
            Rule::RedactHostname => {
                replace_literal(doc, PRIVATE_REGISTRY_URL, REGISTRY_URL_PLACEHOLDER)
            }
            Rule::RedactCredentials => {
                CREDENTIAL_RE.replace_all(doc, NoExpand(CREDENTIAL_PLACEHOLDER))
            }
            Rule::CollapseBlankLines => BLANK_LINES_RE.replace_all(doc, "\n\n"),
            Rule::TrimTagIndent => TAG_INDENT_RE.replace_all(doc, "<"),
        }
    }
}

fn replace_literal<'a>(doc: &'a str, from: &str, to: &str) -> Cow<'a, str> {
    if doc.contains(from) {
        Cow::Owned(doc.replace(from, to))
    } else {
        Cow::Borrowed(doc)
    }
}

/// Wraps `<table>` elements in the site's table shortcode.
///
/// A table already preceded by the opening shortcode (or a `</table>`
/// already followed by the closing one) is left as is.
fn wrap_tables(doc: &str) -> Cow<'_, str> {
    let opened = TABLE_OPEN_RE.replace_all(doc, |caps: &Captures| {
        if caps.get(1).is_some() {
            caps[0].to_string()
        } else {
            format!("{}\n<table>", TABLE_SHORTCODE_OPEN)
        }
    });

    let closed = TABLE_CLOSE_RE
        .replace_all(&opened, |caps: &Captures| {
            if caps.get(1).is_some() {
                caps[0].to_string()
            } else {
                format!("</table>\n{}", TABLE_SHORTCODE_CLOSE)
            }
        })
        .into_owned();

    if closed == doc {
        Cow::Borrowed(doc)
    } else {
        Cow::Owned(closed)
    }
}

fn rewrite_image_paths<'a>(doc: &'a str, ctx: &RuleContext<'_>) -> Cow<'a, str> {
    IMAGE_RE.replace_all(doc, |caps: &Captures| {
        match published_image_path(&caps[2], ctx) {
            Some(src) => format!("![{}]({})", &caps[1], src),
            None => caps[0].to_string(),
        }
    })
}

/// Maps a relative image target onto the published image tree.
///
/// Returns `None` for targets that are already absolute or external.
pub fn published_image_path(target: &str, ctx: &RuleContext<'_>) -> Option<String> {
    if target.is_empty() || is_absolute_target(target) {
        return None;
    }

    let path = match target.strip_prefix("./images/") {
        Some(rest) => match ctx.image_paths {
            ImagePaths::Scoped => join_site_path(&["images", ctx.version, ctx.output_dir, rest]),
            ImagePaths::Direct => join_site_path(&["images", ctx.version, rest]),
        },
        // Converter-generated `<basename>_files/...` folders, relocated
        // alongside the job's output directory.
        None => join_site_path(&[
            "images",
            ctx.version,
            ctx.output_dir,
            target.trim_start_matches("./"),
        ]),
    };

    Some(path)
}

fn is_absolute_target(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with('/')
        || lower.starts_with('#')
        || lower.starts_with("data:")
        || lower.starts_with("mailto:")
        || lower.contains("://")
}

fn join_site_path(segments: &[&str]) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", parts.join("/"))
}

fn figure_shortcodes(doc: &str, width: u32) -> Cow<'_, str> {
    IMAGE_RE.replace_all(doc, |caps: &Captures| {
        format!(
            r#"{{{{<figure src="{}" width="{}" label="{}">}}}}"#,
            &caps[2], width, &caps[1]
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> RuleContext<'static> {
        RuleContext {
            version: "2024.1",
            output_dir: "wallaroo-tutorials/keras",
            image_paths: ImagePaths::Scoped,
            figure_width: 800,
        }
    }

    fn apply(rule: Rule, doc: &str) -> String {
        rule.apply(doc, &ctx()).into_owned()
    }

    fn assert_idempotent(rule: Rule, doc: &str) {
        let once = apply(rule, doc);
        let twice = apply(rule, &once);
        assert_eq!(once, twice, "{} is not idempotent", rule.name());
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<_> = Rule::ALL.iter().map(|r| r.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Rule::ALL.len());
    }

    #[test]
    fn table_wrapping_only_in_legacy() {
        assert!(Rule::WrapTables.enabled_in(Profile::Legacy));
        assert!(!Rule::WrapTables.enabled_in(Profile::Current));
        assert!(Rule::RedactCredentials.enabled_in(Profile::Current));
        assert!(!Rule::RedactHostname.enabled_in(Profile::Legacy));
        assert!(Rule::RedactEmail.enabled_in(Profile::Legacy));
    }

    // ===========================================
    // Tag stripping
    // ===========================================

    #[test]
    fn strip_divs_removes_wrapper_tags() {
        let doc = "<div>\n<style scoped>x</style>\n<table border=\"1\" class=\"dataframe\">\n</table>\n</div>";
        let out = apply(Rule::StripDivs, doc);
        assert_eq!(
            out,
            "\n<style scoped>x</style>\n<table border=\"1\" class=\"dataframe\">\n</table>\n"
        );
    }

    #[test]
    fn strip_divs_handles_attributes() {
        assert_eq!(apply(Rule::StripDivs, r#"a<div class="x" id="y">b</div>c"#), "abc");
    }

    #[test]
    fn strip_styles_spans_lines() {
        let doc = "before\n<style scoped>\n    .dataframe tbody tr th {\n        vertical-align: top;\n    }\n</style>\nafter";
        assert_eq!(apply(Rule::StripStyles, doc), "before\n\nafter");
    }

    #[test]
    fn strip_styles_is_non_greedy() {
        let doc = "<style>a</style>keep<style>b</style>";
        assert_eq!(apply(Rule::StripStyles, doc), "keep");
    }

    #[test]
    fn untouched_document_is_borrowed() {
        let doc = "# Title\n\nplain text\n";
        for rule in Rule::ALL {
            assert!(
                matches!(rule.apply(doc, &ctx()), Cow::Borrowed(_)),
                "{} changed a plain document",
                rule.name()
            );
        }
    }

    // ===========================================
    // Table wrapping
    // ===========================================

    #[test]
    fn wrap_tables_adds_shortcodes() {
        let doc = "<table border=\"1\" class=\"dataframe\">\n<tr></tr>\n</table>";
        let out = apply(Rule::WrapTables, doc);
        assert_eq!(
            out,
            "{{<table \"table table-striped table-bordered\" >}}\n<table>\n<tr></tr>\n</table>\n{{</table>}}"
        );
    }

    #[test]
    fn wrap_tables_is_idempotent() {
        assert_idempotent(Rule::WrapTables, "<table>\n<tr><td>1</td></tr>\n</table>\n\n<table class=\"x\"></table>");
    }

    #[test]
    fn wrap_tables_ignores_tbody() {
        let doc = "<tbody></tbody>";
        assert_eq!(apply(Rule::WrapTables, doc), doc);
    }

    // ===========================================
    // Domain and redaction
    // ===========================================

    #[test]
    fn public_domain_replaces_every_occurrence() {
        let doc = "https://api.wallaroocommunity.ninja and keycloak.wallaroocommunity.ninja";
        let out = apply(Rule::PublicDomain, doc);
        assert_eq!(out.matches(PRIVATE_DOMAIN).count(), 0);
        assert_eq!(out.matches(PUBLIC_DOMAIN).count(), 2);
        assert_idempotent(Rule::PublicDomain, doc);
    }

    #[test]
    fn redact_email() {
        let out = apply(Rule::RedactEmail, "'user': 'gib.bhojraj@wallaroo.ai'");
        assert_eq!(out, "'user': 'sample.user@wallaroo.ai'");
    }

    #[test]
    fn redact_hostname() {
        let doc = "registry_url = 'https://adb-5939996465837398.18.azuredatabricks.net'";
        let out = apply(Rule::RedactHostname, doc);
        assert_eq!(
            out,
            "registry_url = 'https://sample.registry.service.azuredatabricks.net'"
        );
    }

    #[test]
    fn redact_credentials_replaces_value() {
        let doc = "{'EDGE_BUNDLE': 'secretvalue123', 'CONFIG_CPUS': 1}";
        let out = apply(Rule::RedactCredentials, doc);
        assert_eq!(out, "{'EDGE_BUNDLE': 'abcde', 'CONFIG_CPUS': 1}");
        assert!(!out.contains("secretvalue123"));
        assert_idempotent(Rule::RedactCredentials, doc);
    }

    #[test]
    fn redact_credentials_does_not_cross_lines() {
        let doc = "'EDGE_BUNDLE': 'abc\ndef'";
        assert_eq!(apply(Rule::RedactCredentials, doc), doc);
    }

    #[test]
    fn assay_image_becomes_absolute() {
        let doc = r#"<img src="images/housepricesaga-sample-assay.png">"#;
        let out = apply(Rule::AssayImage, doc);
        assert_eq!(out, r#"<img src="/images/housepricesaga-sample-assay.png">"#);
        assert_idempotent(Rule::AssayImage, doc);
    }

    // ===========================================
    // Images
    // ===========================================

    #[test]
    fn local_images_are_scoped_to_output_dir() {
        let out = apply(Rule::ImagePaths, "![alt text](./images/foo.png)");
        assert_eq!(
            out,
            "![alt text](/images/2024.1/wallaroo-tutorials/keras/foo.png)"
        );
    }

    #[test]
    fn local_images_direct_mode() {
        let ctx = RuleContext {
            image_paths: ImagePaths::Direct,
            ..ctx()
        };
        let out = Rule::ImagePaths.apply("![alt](./images/foo.png)", &ctx);
        assert_eq!(out, "![alt](/images/2024.1/foo.png)");
    }

    #[test]
    fn generated_images_are_placed_under_output_dir() {
        let out = apply(
            Rule::ImagePaths,
            "![png](upload-reference_files/upload-reference_12_0.png)",
        );
        assert_eq!(
            out,
            "![png](/images/2024.1/wallaroo-tutorials/keras/upload-reference_files/upload-reference_12_0.png)"
        );
    }

    #[test]
    fn output_dir_at_docs_root_has_no_empty_segment() {
        let ctx = RuleContext {
            output_dir: "",
            ..ctx()
        };
        let out = Rule::ImagePaths.apply("![png](a_files/a.png)", &ctx);
        assert_eq!(out, "![png](/images/2024.1/a_files/a.png)");
    }

    #[test]
    fn absolute_and_external_images_are_untouched() {
        let doc = "![a](/images/x.png) ![b](https://example.com/y.png) ![c](data:image/png;base64,AA)";
        assert_eq!(apply(Rule::ImagePaths, doc), doc);
    }

    #[test]
    fn image_paths_is_idempotent() {
        assert_idempotent(Rule::ImagePaths, "![png](a_files/a.png)\n![x](./images/b.png)");
    }

    #[test]
    fn figure_shortcode_carries_src_width_label() {
        let out = apply(Rule::FigureShortcodes, "![alt text](/images/2024.1/foo.png)");
        assert_eq!(
            out,
            r#"{{<figure src="/images/2024.1/foo.png" width="800" label="alt text">}}"#
        );
    }

    #[test]
    fn figure_shortcode_uses_configured_width() {
        let ctx = RuleContext {
            figure_width: 640,
            ..ctx()
        };
        let out = Rule::FigureShortcodes.apply("![a](b.png)", &ctx);
        assert_eq!(out, r#"{{<figure src="b.png" width="640" label="a">}}"#);
    }

    #[test]
    fn figure_shortcode_is_noop_on_shortcode() {
        let shortcode = r#"{{<figure src="/images/a.png" width="800" label="a">}}"#;
        assert_eq!(apply(Rule::FigureShortcodes, shortcode), shortcode);
    }

    #[test]
    fn plain_links_are_not_figures() {
        let doc = "[docs](https://docs.wallaroo.ai)";
        assert_eq!(apply(Rule::FigureShortcodes, doc), doc);
        assert_eq!(apply(Rule::ImagePaths, doc), doc);
    }

    // ===========================================
    // Whitespace
    // ===========================================

    #[test]
    fn collapse_blank_lines_leaves_single_blank_line() {
        let doc = "a\n\n\nb\n\n\n\n\nc\n\nd";
        let out = apply(Rule::CollapseBlankLines, doc);
        assert_eq!(out, "a\n\nb\n\nc\n\nd");
        assert!(!out.contains("\n\n\n"));
        assert_idempotent(Rule::CollapseBlankLines, doc);
    }

    #[test]
    fn collapse_blank_lines_handles_crlf_runs() {
        let doc = "a\r\n\r\n\r\n\r\nb\r\n\r\nc";
        let out = apply(Rule::CollapseBlankLines, doc);
        assert_eq!(out, "a\n\nb\r\n\r\nc");
        assert_idempotent(Rule::CollapseBlankLines, doc);
    }

    #[test]
    fn collapse_blank_lines_keeps_paragraph_breaks() {
        let doc = "a\n\nb\nc";
        assert!(matches!(
            Rule::CollapseBlankLines.apply(doc, &ctx()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn trim_tag_indent_only_strips_before_tags() {
        let doc = "    <table>\n    code block\n  <tr>";
        assert_eq!(apply(Rule::TrimTagIndent, doc), "<table>\n    code block\n<tr>");
        assert_idempotent(Rule::TrimTagIndent, doc);
    }
}
