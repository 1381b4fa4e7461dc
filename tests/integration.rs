use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_solmark")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative))
        .unwrap_or_else(|e| panic!("missing {}: {}", relative, e))
}

// -- AST documentation --

#[test]
fn writes_one_document_per_contract() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    for name in ["IToken", "Token", "Math"] {
        assert!(
            dir.path().join(format!("contracts/{}.md", name)).is_file(),
            "{} not generated",
            name
        );
    }
}

#[test]
fn contract_document_layout() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    let token = read(dir.path(), "contracts/Token.md");
    assert!(token.starts_with("# Token\n\n## Abstract Contract Description\n\nLicense: MIT\n"));
    assert!(token.contains("```solidity\nabstract contract Token is IToken\n```"));
    assert!(token.contains("Basic token\n\n*Keeps balances in a mapping*\n\nsecurity: audited"));

    // groups appear in fixed order and are indexed
    let order = [
        "## Enums info",
        "## Structs info",
        "## Events info",
        "## Errors info",
        "## Constants info",
        "## State variables info",
        "## Modifiers info",
        "## Functions info",
        "## Using-for directives info",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|h| token.find(h).unwrap_or_else(|| panic!("missing {}", h)))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(token.contains("* [State variables info](#state-variables-info)"));

    assert!(token.contains("enum Side {\n\tBuy,\n\tSell\n}"));
    assert!(token.contains("struct Order {\n\taddress owner;\n\tuint256 amount;\n}"));
    assert!(token.contains("| owner | address | Who placed it |"));
    assert!(token.contains(
        "event Transfer(address indexed from, address indexed to, uint256 value)"
    ));
    assert!(token.contains(
        "### MAX (0xd49d5181)\n\n```solidity\nuint256 constant MAX = 1000 * 10\n```"
    ));
    assert!(token.contains("using Math for uint256"));

    // internal functions stay out of a contract's surface
    assert!(!token.contains("_mint"));
}

#[test]
fn inherited_documentation() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    let token = read(dir.path(), "contracts/Token.md");
    // explicit @inheritdoc
    assert!(token.contains(
        "### transfer (0xa9059cbb)\n\n```solidity\nfunction transfer(address to, uint256 amount) external onlyOwner override returns (bool)\n```\n\nMoves `amount` tokens to `to`"
    ));
    assert!(token.contains("| to | address | Recipient |"));
    assert!(token.contains("| [0] | bool | Whether it succeeded |"));
    // public getter overriding an undocumented-in-place interface function
    assert!(token.contains(
        "### totalSupply (0x18160ddd)\n\n```solidity\nuint256 totalSupply\n```\n\nTotal supply"
    ));
    assert!(token.contains("| [0] | uint256 | The supply |"));
}

#[test]
fn internal_library_is_documented() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    let math = read(dir.path(), "contracts/Math.md");
    assert!(math.contains("## Library Description"));
    assert!(math.contains("function add(uint256 a, uint256 b) internal pure returns (uint256)"));
    assert!(math.contains("Adds two numbers"));
}

#[test]
fn problems_are_reported_as_warnings() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("token.json"))
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid @inheritdoc Missing on function burn"))
        .stderr(predicate::str::contains("UserDefinedValueTypeDefinition"));

    let token = read(dir.path(), "contracts/Token.md");
    assert!(token.contains("### burn (0x42966c68)"));
    assert!(token.contains("Burns tokens"));
}

#[test]
fn strict_mode_fails_contracts_with_problems() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--strict"])
        .arg(fixture_path("token.json"))
        .assert()
        .success()
        .stderr(predicate::str::contains("strict mode"));

    assert!(!dir.path().join("contracts/Token.md").exists());
    assert!(dir.path().join("contracts/IToken.md").is_file());
}

#[test]
fn long_signatures_wrap() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--max-width", "40"])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    let token = read(dir.path(), "contracts/Token.md");
    assert!(token.contains(
        "function transfer(\n\taddress to,\n\tuint256 amount\n)\n\texternal\n\tonlyOwner\n\toverride\n\treturns (bool);\n"
    ));
}

// -- selection --

#[test]
fn contract_filter() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--contract", "IToken"])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    assert!(dir.path().join("contracts/IToken.md").is_file());
    assert!(!dir.path().join("contracts/Token.md").exists());
}

#[test]
fn skip_files_filter() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--skip-files", "contracts"])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    assert!(!dir.path().join("contracts").exists());
}

#[test]
fn same_contract_in_two_builds_is_generated_once() {
    let inputs = TempDir::new().unwrap();
    fs::copy(fixture_path("token.json"), inputs.path().join("a.json")).unwrap();
    fs::copy(fixture_path("token.json"), inputs.path().join("b.json")).unwrap();
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-vv"])
        .arg(inputs.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already generated"));

    assert!(dir.path().join("contracts/Token.md").is_file());
}

// -- compiler docs --

#[test]
fn build_without_ast_uses_compiler_docs() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("vault-devdoc.json"))
        .assert()
        .success();

    let vault = read(dir.path(), "src/vault/Vault.md");
    assert!(vault.contains("## Contract Description\n\nLicense: UNLICENSED"));
    assert!(vault.contains("Author: Solmark Team\n\nSimple vault\n\nHolds assets"));
    assert!(vault.contains("```solidity\nconstructor(IERC20 asset)\n```"));
    assert!(vault.contains("### deposit (0xb6b55f25)"));
    assert!(vault.contains("Deposit assets\n\n*Rounds down*"));
    assert!(vault.contains("| assets | uint256 | Amount to deposit |"));
    assert!(vault.contains("| shares | uint256 | Minted shares |"));
    assert!(vault.contains(
        "### totalAssets (0x01e1d114)\n\n```solidity\nuint256 public totalAssets\n```"
    ));
    assert!(vault.contains("| [0] | uint256 | Asset count |"));
    assert!(vault.contains("event Deposit(address indexed owner, uint256 assets)"));
}

#[test]
fn compiler_docs_on_request() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--docs", "compiler", "--contract", "Token"])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    // the fixture's ABI is empty; the header still comes from the AST
    let token = read(dir.path(), "contracts/Token.md");
    assert!(token.contains("abstract contract Token is IToken"));
    assert!(!token.contains("## Functions info"));
}

// -- formats and output handling --

#[test]
fn json_format() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-f", "json", "--contract", "IToken"])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    let out = read(dir.path(), "contracts/IToken.json");
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["name"], "IToken");
    assert_eq!(value["kind"], "interface");
    assert_eq!(value["documentation"]["natspec"]["title"], "Token interface");
    let transfer = &value["groups"][0]["records"][0];
    assert_eq!(transfer["title"], "transfer (0xa9059cbb)");
    assert_eq!(transfer["natspec"]["params"][0]["name"], "to");
}

#[test]
fn unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-f", "html"])
        .arg(fixture_path("token.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn clean_removes_stale_output() {
    let dir = TempDir::new().unwrap();
    let stale = dir.path().join("Old.md");
    fs::write(&stale, "stale").unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--clean"])
        .arg(fixture_path("token.json"))
        .assert()
        .success();

    assert!(!stale.exists());
    assert!(dir.path().join("contracts/Token.md").is_file());
}

#[test]
fn clean_refuses_a_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("docs.md");
    fs::write(&file, "keep me").unwrap();

    cmd()
        .args(["-o", file.to_str().unwrap(), "--clean"])
        .arg(fixture_path("token.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "keep me");
}

#[test]
fn malformed_build_info_fails() {
    let inputs = TempDir::new().unwrap();
    let bad = inputs.path().join("bad.json");
    fs::write(&bad, "{ not json").unwrap();
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed build-info"));
}

#[test]
fn requires_input_files() {
    cmd().assert().failure();
}
