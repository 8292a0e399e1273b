use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::target::ConnectionTarget;
use crate::types::SeedResult;

/// A product to create on the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductDescriptor {
    /// Unique slug for the product, also the last segment of its URL.
    pub endpoint: String,
    pub name: String,
    pub description: String,
}

/// A report bundle to store as a run.
///
/// Run names do not need to be unique, storing the same name again creates a new version of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDescriptor {
    pub name: String,
    /// Directory of pre-generated analysis output.
    pub output: PathBuf,
    /// Product URL the run is stored to.
    pub url: String,
    pub tag: Option<String>,
    pub description: Option<String>,
}

/// The products and runs to seed, in the order they are sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPlan {
    pub products: Vec<ProductDescriptor>,
    pub runs: Vec<RunDescriptor>,
}

impl SeedPlan {
    pub fn new(products: Vec<ProductDescriptor>, runs: Vec<RunDescriptor>) -> Self {
        Self { products, runs }
    }

    /// The fixture used by the web end-to-end tests: one `e2e` product and five runs stored to it.
    pub fn builtin(target: &ConnectionTarget, reports_dir: &Path) -> Self {
        let url = target.product_url("e2e");
        let run = |name: &str, output: &str, tag: Option<&str>, description: Option<&str>| {
            RunDescriptor {
                name: name.to_string(),
                output: reports_dir.join(output),
                url: url.clone(),
                tag: tag.map(str::to_string),
                description: description.map(str::to_string),
            }
        };

        Self {
            products: vec![ProductDescriptor {
                endpoint: "e2e".to_string(),
                name: "e2e".to_string(),
                description: "This is my product for e2e test.".to_string(),
            }],
            runs: vec![
                run(
                    "macros",
                    "macros",
                    Some("v1.0.0"),
                    Some("Contains macro expansions."),
                ),
                run("simple", "simple", None, Some("This is my simple run.")),
                run(
                    "simple",
                    "simple",
                    Some("v0.0.2"),
                    Some("This is my updated run."),
                ),
                run(
                    "remove",
                    "simple",
                    Some("v0.0.1-deprecated"),
                    Some("This can can be removed."),
                ),
                run("suppress", "suppress", None, None),
            ],
        }
    }

    /// Load a plan from a TOML file.
    ///
    /// ```toml
    /// [[product]]
    /// endpoint = "e2e"
    /// name = "e2e"
    /// description = "This is my product for e2e test."
    ///
    /// [[run]]
    /// name = "macros"
    /// output = "macros"
    /// product = "e2e"
    /// tag = "v1.0.0"
    /// ```
    ///
    /// A run names either the `product` endpoint it belongs to or an explicit `url`. Relative
    /// `output` paths are resolved against `reports_dir`.
    pub fn from_toml_file(
        path: &Path,
        target: &ConnectionTarget,
        reports_dir: &Path,
    ) -> SeedResult<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed plan {}", path.display()))?;
        Self::from_toml_str(&content, target, reports_dir)
            .with_context(|| format!("Invalid seed plan {}", path.display()))
    }

    pub fn from_toml_str(
        content: &str,
        target: &ConnectionTarget,
        reports_dir: &Path,
    ) -> SeedResult<Self> {
        let file: PlanFile = toml::from_str(content).context("Failed to parse seed plan")?;

        let runs = file
            .run
            .into_iter()
            .map(|run| run.resolve(target, reports_dir))
            .collect::<SeedResult<Vec<_>>>()?;

        Ok(Self {
            products: file.product,
            runs,
        })
    }

    /// Product endpoints that appear more than once. The server rejects these, the seeder does
    /// not.
    pub fn duplicate_endpoints(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = vec![];
        for product in &self.products {
            if !seen.insert(product.endpoint.as_str())
                && !duplicates.contains(&product.endpoint.as_str())
            {
                duplicates.push(product.endpoint.as_str());
            }
        }
        duplicates
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    #[serde(default)]
    product: Vec<ProductDescriptor>,
    #[serde(default)]
    run: Vec<PlanRun>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanRun {
    name: String,
    output: PathBuf,
    product: Option<String>,
    url: Option<String>,
    tag: Option<String>,
    description: Option<String>,
}

impl PlanRun {
    fn resolve(self, target: &ConnectionTarget, reports_dir: &Path) -> SeedResult<RunDescriptor> {
        let url = match (self.product, self.url) {
            (Some(product), None) => target.product_url(&product),
            (None, Some(url)) => {
                url::Url::parse(&url)
                    .with_context(|| format!("Run '{}' has an invalid url '{url}'", self.name))?;
                url
            }
            (Some(_), Some(_)) => {
                anyhow::bail!("Run '{}' must set only one of `product` or `url`", self.name)
            }
            (None, None) => {
                anyhow::bail!("Run '{}' must set one of `product` or `url`", self.name)
            }
        };

        let output = if self.output.is_absolute() {
            self.output
        } else {
            reports_dir.join(self.output)
        };

        Ok(RunDescriptor {
            name: self.name,
            output,
            url,
            tag: self.tag,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target() -> ConnectionTarget {
        ConnectionTarget::new("localhost", 8001).unwrap()
    }

    #[test]
    fn builtin_plan_matches_fixture() {
        let plan = SeedPlan::builtin(&target(), Path::new("/fixture/reports"));

        assert_eq!(1, plan.products.len());
        assert_eq!("e2e", plan.products[0].endpoint);

        let names = plan.runs.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(vec!["macros", "simple", "simple", "remove", "suppress"], names);

        let remove = &plan.runs[3];
        assert_eq!(PathBuf::from("/fixture/reports/simple"), remove.output);
        assert_eq!(Some("v0.0.1-deprecated"), remove.tag.as_deref());

        let suppress = &plan.runs[4];
        assert_eq!(None, suppress.tag);
        assert_eq!(None, suppress.description);

        assert!(plan
            .runs
            .iter()
            .all(|r| r.url == "http://localhost:8001/e2e"));
    }

    #[test]
    fn parse_plan_file() {
        let plan = SeedPlan::from_toml_str(
            r#"
[[product]]
endpoint = "other"
name = "Other product"
description = "Another one"

[[run]]
name = "first"
output = "simple"
product = "other"
tag = "v1"

[[run]]
name = "absolute"
output = "/abs/reports"
url = "http://elsewhere:1234/other"
"#,
            &target(),
            Path::new("/fixture/reports"),
        )
        .unwrap();

        assert_eq!(
            vec![ProductDescriptor {
                endpoint: "other".to_string(),
                name: "Other product".to_string(),
                description: "Another one".to_string(),
            }],
            plan.products
        );
        assert_eq!(
            vec![
                RunDescriptor {
                    name: "first".to_string(),
                    output: PathBuf::from("/fixture/reports/simple"),
                    url: "http://localhost:8001/other".to_string(),
                    tag: Some("v1".to_string()),
                    description: None,
                },
                RunDescriptor {
                    name: "absolute".to_string(),
                    output: PathBuf::from("/abs/reports"),
                    url: "http://elsewhere:1234/other".to_string(),
                    tag: None,
                    description: None,
                },
            ],
            plan.runs
        );
    }

    #[test]
    fn run_needs_exactly_one_destination() {
        let neither = r#"
[[run]]
name = "lost"
output = "simple"
"#;
        assert!(SeedPlan::from_toml_str(neither, &target(), Path::new("/r")).is_err());

        let both = r#"
[[run]]
name = "lost"
output = "simple"
product = "e2e"
url = "http://localhost:8001/e2e"
"#;
        assert!(SeedPlan::from_toml_str(both, &target(), Path::new("/r")).is_err());
    }

    #[test]
    fn reject_unknown_keys() {
        let content = r#"
[[product]]
endpoint = "e2e"
name = "e2e"
description = "d"
colour = "blue"
"#;
        assert!(SeedPlan::from_toml_str(content, &target(), Path::new("/r")).is_err());
    }

    #[test]
    fn report_duplicate_endpoints() {
        let product = |endpoint: &str| ProductDescriptor {
            endpoint: endpoint.to_string(),
            name: endpoint.to_string(),
            description: String::new(),
        };
        let plan = SeedPlan::new(
            vec![product("a"), product("b"), product("a"), product("a")],
            vec![],
        );
        assert_eq!(vec!["a"], plan.duplicate_endpoints());
        assert!(SeedPlan::builtin(&target(), Path::new("/r"))
            .duplicate_endpoints()
            .is_empty());
    }
}
