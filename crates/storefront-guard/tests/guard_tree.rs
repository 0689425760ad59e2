//! 在临时目录中构造应用源码树，端到端验证守卫引擎。

use std::fs;
use std::path::{Path, PathBuf};

use storefront_guard::{Guard, GuardConfig, GuardError, RuleId};
use tempfile::TempDir;

const CONFORMING: &str = "import type { AsyncPageProps } from '@/lib/params';\n\
\n\
export default async function Page({ params, searchParams }: AsyncPageProps) {\n\
  return null;\n\
}\n";

const ALIASED: &str = "export default async function MenuPage({ rawParams }) {\n\
  const params = await rawParams;\n\
  return params;\n\
}\n";

const LEGACY: &str = "import type { LegacyPageProps } from '@/types/legacy';\n\
\n\
export default function ItemPage({ params }: LegacyPageProps) {\n\
  return params.itemSlug;\n\
}\n";

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("测试路径必须带父目录")).expect("创建目录");
    fs::write(path, text).expect("写入测试文件");
}

fn app() -> TempDir {
    let dir = tempfile::tempdir().expect("创建临时目录");
    write(dir.path(), "src/app/[brandSlug]/page.tsx", CONFORMING);
    write(dir.path(), "src/app/[brandSlug]/menu/page.tsx", ALIASED);
    write(dir.path(), "src/app/[brandSlug]/menu/[itemSlug]/page.tsx", LEGACY);
    dir
}

fn guard(rules: &[RuleId]) -> Guard {
    Guard::with_rules(GuardConfig::builtin().expect("内置规则表必须合法"), rules)
        .expect("规则表合法")
}

#[test]
fn mixed_tree_flags_exactly_the_two_offenders() {
    let dir = app();
    let report = guard(&RuleId::ALL).check_tree(dir.path()).expect("检查应完成");

    assert_eq!(report.files_scanned(), 3);
    assert_eq!(
        report.offending_paths(),
        [
            Path::new("src/app/[brandSlug]/menu/[itemSlug]/page.tsx"),
            Path::new("src/app/[brandSlug]/menu/page.tsx"),
        ]
    );

    let alias_page = Path::new("src/app/[brandSlug]/menu/page.tsx");
    let legacy_page = Path::new("src/app/[brandSlug]/menu/[itemSlug]/page.tsx");
    let mapping: Vec<(RuleId, &Path)> = report
        .findings()
        .iter()
        .map(|finding| (finding.rule, finding.path.as_path()))
        .collect();
    assert_eq!(
        mapping,
        [
            (RuleId::NoLegacyPropsType, legacy_page),
            (RuleId::NoDefensiveParamAliases, alias_page),
            (RuleId::CanonicalSignatureOnly, legacy_page),
            (RuleId::CanonicalSignatureOnly, alias_page),
        ]
    );

    let aliases: Vec<_> = report.for_rule(RuleId::NoDefensiveParamAliases).collect();
    assert_eq!(aliases.len(), 1);
    assert_eq!(aliases[0].path, PathBuf::from("src/app/[brandSlug]/menu/page.tsx"));
    assert_eq!(aliases[0].line, 1);
    assert_eq!(aliases[0].fragment, "({ rawParams })");

    let legacy: Vec<_> = report.for_rule(RuleId::NoLegacyPropsType).collect();
    assert_eq!(legacy.len(), 1);
    assert_eq!(
        legacy[0].path,
        PathBuf::from("src/app/[brandSlug]/menu/[itemSlug]/page.tsx")
    );
}

#[test]
fn single_rule_guards_see_only_their_offender() {
    let dir = app();

    let report = guard(&[RuleId::NoDefensiveParamAliases])
        .check_tree(dir.path())
        .expect("检查应完成");
    assert_eq!(report.offending_paths(), [Path::new("src/app/[brandSlug]/menu/page.tsx")]);

    let report = guard(&[RuleId::NoLegacyPropsType])
        .check_tree(dir.path())
        .expect("检查应完成");
    assert_eq!(
        report.offending_paths(),
        [Path::new("src/app/[brandSlug]/menu/[itemSlug]/page.tsx")]
    );

    let report = guard(&[RuleId::NoRawRouteParamNames])
        .check_tree(dir.path())
        .expect("检查应完成");
    assert!(report.is_clean());
}

#[test]
fn legacy_annotation_yields_one_legacy_finding() {
    let dir = tempfile::tempdir().expect("创建临时目录");
    write(
        dir.path(),
        "src/app/page.tsx",
        "export default async function Page({ params }: LegacyPageProps) {}\n",
    );
    let report = guard(&RuleId::ALL).check_tree(dir.path()).expect("检查应完成");
    assert_eq!(report.for_rule(RuleId::NoLegacyPropsType).count(), 1);
}

#[test]
fn sanctioned_signatures_pass_every_rule() {
    let dir = tempfile::tempdir().expect("创建临时目录");
    write(dir.path(), "src/app/page.tsx", "export default function Home() {}\n");
    write(
        dir.path(),
        "src/app/[brandSlug]/page.tsx",
        "export default async function Brand({ params }: AsyncPageProps) {}\n",
    );
    write(
        dir.path(),
        "src/app/[brandSlug]/checkout/page.tsx",
        "export default async function Checkout({\n  searchParams,\n  params,\n}: AsyncPageProps<{ brandSlug: string }>) {}\n",
    );
    write(
        dir.path(),
        "src/app/[brandSlug]/layout.tsx",
        "export default function BrandLayout({ children }) { return children; }\n",
    );

    let report = guard(&RuleId::ALL).check_tree(dir.path()).expect("检查应完成");
    assert!(report.is_clean(), "{report}");
    assert_eq!(report.files_scanned(), 4);
}

#[test]
fn skipped_directories_and_other_files_are_not_scanned() {
    let dir = tempfile::tempdir().expect("创建临时目录");
    write(dir.path(), "src/app/node_modules/pkg/page.tsx", ALIASED);
    write(dir.path(), "src/app/menu/loading.tsx", ALIASED);
    write(dir.path(), "src/app/menu/page.css", ALIASED);

    let report = guard(&RuleId::ALL).check_tree(dir.path()).expect("检查应完成");
    assert!(report.is_clean());
    assert_eq!(report.files_scanned(), 0);
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let dir = app();
    let guard = guard(&RuleId::ALL);
    let first = guard.check_tree(dir.path()).expect("检查应完成");
    let second = guard.check_tree(dir.path()).expect("检查应完成");
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn malformed_rule_table_is_a_config_error() {
    let error = GuardConfig::from_toml_str("[files]\nroots = 3\n").expect_err("应解析失败");
    assert!(matches!(error, GuardError::Config(_)));
}
