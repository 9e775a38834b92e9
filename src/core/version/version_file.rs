// ─── Version File ───
// Parses a Mojang game manifest (per-version JSON) and answers the questions
// launch planning asks of it: which libraries, which arguments, which Java.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::manifest::VersionType;
use super::rules::{argument_rules_allow, rules_allow, Rule, RuleContext};
use crate::core::error::{LauncherResult, ParseError};
use crate::core::json;
use crate::core::maven::{MavenArtifact, MOJANG_LIBRARIES};

/// Java major version assumed for manifests that predate the `javaVersion` key.
const LEGACY_JAVA_MAJOR: u32 = 8;

/// A fully parsed Mojang version JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameManifest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<AssetIndexRef>,
    #[serde(default)]
    pub assets: String,
    #[serde(default)]
    pub compliance_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<VersionDownloads>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_version: Option<JavaVersion>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub main_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,
    /// Legacy `minecraftArguments` field (pre-1.13).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft_arguments: Option<String>,
    #[serde(default)]
    pub minimum_launcher_version: u32,
    #[serde(default)]
    pub release_time: String,
    #[serde(default)]
    pub time: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub version_type: Option<VersionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,
}

/// Reference to the asset index document of a version.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    /// Sum of every object in the index; routinely above 2^31.
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<DownloadArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_mappings: Option<DownloadArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<DownloadArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_mappings: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadArtifact {
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersion {
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub major_version: u32,
    /// LabyMod writes the major version under this key instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl JavaVersion {
    pub fn major(&self) -> u32 {
        if self.major_version != 0 {
            self.major_version
        } else {
            self.version.unwrap_or(0)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<Argument>,
    #[serde(default)]
    pub jvm: Vec<Argument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Argument {
    Plain(String),
    Conditional {
        #[serde(default)]
        rules: Vec<Rule>,
        value: ArgumentValue,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Logging {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<LoggingClient>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingClient {
    /// JVM argument template, e.g. `-Dlog4j.configurationFile=${path}`.
    #[serde(default)]
    pub argument: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<LoggingFile>,
    #[serde(rename = "type", default)]
    pub log_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub url: String,
}

// ─── Library Entry with Rules ───

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Library {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Alternate Maven repository base for libraries without `downloads`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// OS name -> classifier template, e.g. `"natives-windows-${arch}"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natives: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<LibraryArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifiers: Option<BTreeMap<String, LibraryArtifact>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryArtifact {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub url: String,
}

impl Library {
    pub fn artifact(&self) -> Option<&LibraryArtifact> {
        self.downloads.as_ref()?.artifact.as_ref()
    }

    pub fn is_applicable(&self, ctx: &RuleContext) -> bool {
        rules_allow(&self.rules, ctx)
    }

    /// Path of the main artifact relative to the libraries directory.
    ///
    /// Uses `downloads.artifact.path` when present, otherwise the Maven
    /// layout derived from `name`.
    pub fn artifact_path(&self) -> LauncherResult<String> {
        if let Some(artifact) = self.artifact().filter(|a| !a.path.is_empty()) {
            return Ok(artifact.path.clone());
        }
        Ok(MavenArtifact::parse(&self.name)?.local_path())
    }

    /// Where to fetch the main artifact from: the explicit artifact URL, or
    /// the Maven layout under `url` (Mojang's repository when unset).
    pub fn download_url(&self) -> LauncherResult<String> {
        if let Some(artifact) = self.artifact().filter(|a| !a.url.is_empty()) {
            return Ok(artifact.url.clone());
        }
        let base = self.url.as_deref().unwrap_or(MOJANG_LIBRARIES);
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            self.artifact_path()?
        ))
    }

    /// Native classifier for the given OS, with `${arch}` substituted.
    pub fn native_classifier(&self, os_name: &str, is_64bit: bool) -> Option<String> {
        let template = self.natives.as_ref()?.get(os_name)?;
        let bits = if is_64bit { "64" } else { "32" };
        Some(template.replace("${arch}", bits))
    }

    /// Download entry of the native classifier for the given OS, if any.
    pub fn native_artifact(&self, os_name: &str, is_64bit: bool) -> Option<&LibraryArtifact> {
        let classifier = self.native_classifier(os_name, is_64bit)?;
        self.downloads
            .as_ref()?
            .classifiers
            .as_ref()?
            .get(&classifier)
    }
}

impl GameManifest {
    /// Libraries whose rules admit them on this host, in manifest order.
    pub fn applicable_libraries(&self, ctx: &RuleContext) -> Vec<&Library> {
        self.libraries
            .iter()
            .filter(|lib| lib.is_applicable(ctx))
            .collect()
    }

    /// Required Java major version. Manifests older than 1.17 carry no
    /// `javaVersion` and run on Java 8.
    pub fn required_java_major(&self) -> u32 {
        self.java_version
            .as_ref()
            .map(JavaVersion::major)
            .filter(|major| *major != 0)
            .unwrap_or(LEGACY_JAVA_MAJOR)
    }

    pub fn client_download(&self) -> Option<&DownloadArtifact> {
        self.downloads.as_ref()?.client.as_ref()
    }

    /// Game arguments that apply on this host.
    pub fn game_arguments(&self, ctx: &RuleContext) -> Vec<String> {
        match &self.arguments {
            Some(args) => flatten_arguments(&args.game, ctx),
            None => match &self.minecraft_arguments {
                Some(s) => s.split_whitespace().map(ToString::to_string).collect(),
                None => vec![],
            },
        }
    }

    /// JVM arguments that apply on this host.
    pub fn jvm_arguments(&self, ctx: &RuleContext) -> Vec<String> {
        match &self.arguments {
            Some(args) => flatten_arguments(&args.jvm, ctx),
            None => vec![],
        }
    }
}

fn flatten_arguments(args: &[Argument], ctx: &RuleContext) -> Vec<String> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Argument::Plain(s) => out.push(s.clone()),
            Argument::Conditional { rules, value } => {
                if !argument_rules_allow(rules, ctx) {
                    continue;
                }
                match value {
                    ArgumentValue::Single(s) => out.push(s.clone()),
                    ArgumentValue::Many(values) => out.extend(values.iter().cloned()),
                }
            }
        }
    }
    out
}

/// Parse a per-version game manifest document.
pub fn parse_game_manifest(bytes: &[u8]) -> Result<GameManifest, ParseError> {
    json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::rules::FeatureSet;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "id": "1.20.4",
            "assetIndex": {
                "id": "12",
                "sha1": "fbd4ba3b4a4a0f3a9da2dfd4e4ab4cb7e3ac3cb1",
                "size": 414389,
                "totalSize": 3000000000u64,
                "url": "https://piston-meta.mojang.com/v1/packages/fbd4/12.json"
            },
            "assets": "12",
            "complianceLevel": 1,
            "downloads": {
                "client": {
                    "sha1": "fd19469fed4a4b4c15b2d5133985f0e3e7816a8a",
                    "size": 24445539,
                    "url": "https://piston-data.mojang.com/v1/objects/fd19/client.jar"
                },
                "client_mappings": {
                    "sha1": "be76ecc174ea25580bdc9bf335481a5192d9f3b7",
                    "size": 9150640,
                    "url": "https://piston-data.mojang.com/v1/objects/be76/client.txt"
                },
                "server": {
                    "sha1": "8dd1a28015f51b1803213892b50b7b4fc76e594d",
                    "size": 49150256,
                    "url": "https://piston-data.mojang.com/v1/objects/8dd1/server.jar"
                }
            },
            "javaVersion": { "component": "java-runtime-gamma", "majorVersion": 17 },
            "libraries": [
                {
                    "name": "com.mojang:blocklist:1.0.10",
                    "downloads": {
                        "artifact": {
                            "path": "com/mojang/blocklist/1.0.10/blocklist-1.0.10.jar",
                            "sha1": "5c685c5ffa94c4cd39496c7184c1d122e515ecef",
                            "size": 964,
                            "url": "https://libraries.minecraft.net/com/mojang/blocklist/1.0.10/blocklist-1.0.10.jar"
                        }
                    }
                },
                {
                    "name": "org.lwjgl:lwjgl:3.3.2:natives-macos",
                    "downloads": {
                        "artifact": {
                            "path": "org/lwjgl/lwjgl/3.3.2/lwjgl-3.3.2-natives-macos.jar",
                            "sha1": "4c6e3c5a5f7e8d5ab2f2f0b6f06c0a9c7f4e1e2d",
                            "size": 129077,
                            "url": "https://libraries.minecraft.net/org/lwjgl/lwjgl/3.3.2/lwjgl-3.3.2-natives-macos.jar"
                        }
                    },
                    "rules": [{ "action": "allow", "os": { "name": "osx" } }]
                }
            ],
            "mainClass": "net.minecraft.client.main.Main",
            "arguments": {
                "game": [
                    "--username",
                    "${auth_player_name}",
                    {
                        "rules": [{ "action": "allow", "features": { "is_demo_user": true } }],
                        "value": "--demo"
                    },
                    {
                        "rules": [{ "action": "allow", "features": { "has_custom_resolution": true } }],
                        "value": ["--width", "${resolution_width}"]
                    }
                ],
                "jvm": [
                    {
                        "rules": [{ "action": "allow", "os": { "name": "osx" } }],
                        "value": ["-XstartOnFirstThread"]
                    },
                    {
                        "rules": [{ "action": "allow", "os": { "arch": "x86" } }],
                        "value": "-Xss1M"
                    },
                    "-cp",
                    "${classpath}"
                ]
            },
            "minimumLauncherVersion": 21,
            "releaseTime": "2023-12-07T12:56:20+00:00",
            "time": "2023-12-07T12:56:20+00:00",
            "type": "release",
            "logging": {
                "client": {
                    "argument": "-Dlog4j.configurationFile=${path}",
                    "file": {
                        "id": "client-1.12.xml",
                        "sha1": "bd65e7d2e3c237be76cfbef4c2405033d7f91521",
                        "size": 888,
                        "url": "https://piston-data.mojang.com/v1/objects/bd65/client-1.12.xml"
                    },
                    "type": "log4j2-xml"
                }
            }
        })
    }

    fn parse(value: &serde_json::Value) -> GameManifest {
        parse_game_manifest(&serde_json::to_vec(value).unwrap()).unwrap()
    }

    /// Every key present in `input` appears in `output` with the same value.
    fn assert_subset(input: &serde_json::Value, output: &serde_json::Value, at: &str) {
        match (input, output) {
            (serde_json::Value::Object(i), serde_json::Value::Object(o)) => {
                for (k, v) in i {
                    let next = format!("{at}.{k}");
                    let out = o.get(k).unwrap_or_else(|| panic!("missing {next}"));
                    assert_subset(v, out, &next);
                }
            }
            (serde_json::Value::Array(i), serde_json::Value::Array(o)) => {
                assert_eq!(i.len(), o.len(), "length differs at {at}");
                for (idx, (a, b)) in i.iter().zip(o).enumerate() {
                    assert_subset(a, b, &format!("{at}[{idx}]"));
                }
            }
            (a, b) => assert_eq!(a, b, "value differs at {at}"),
        }
    }

    #[test]
    fn re_serialization_keeps_every_known_field() {
        let input = sample();
        let manifest = parse(&input);
        let output = serde_json::to_value(&manifest).unwrap();
        assert_subset(&input, &output, "$");
    }

    #[test]
    fn sizes_are_64_bit() {
        let manifest = parse(&sample());
        let index = manifest.asset_index.unwrap();
        assert_eq!(index.total_size, 3_000_000_000);
    }

    #[test]
    fn java_requirement() {
        let manifest = parse(&sample());
        assert_eq!(manifest.required_java_major(), 17);
        assert_eq!(
            manifest.java_version.unwrap().component,
            "java-runtime-gamma"
        );

        let legacy = parse(&serde_json::json!({ "id": "1.12.2" }));
        assert_eq!(legacy.required_java_major(), 8);

        let labymod = parse(&serde_json::json!({
            "id": "labymod",
            "javaVersion": { "component": "java-runtime-delta", "version": 21 }
        }));
        assert_eq!(labymod.required_java_major(), 21);
    }

    #[test]
    fn applicable_libraries_follow_rules() {
        let manifest = parse(&sample());
        let linux = manifest.applicable_libraries(&RuleContext::new("linux", "aarch64"));
        let osx = manifest.applicable_libraries(&RuleContext::new("osx", "aarch64"));
        // an allow rule for another OS does not match, so the default allow stands
        assert_eq!(linux.len(), 2);
        assert_eq!(osx.len(), 2);

        let windows_excluded = parse(&serde_json::json!({
            "id": "x",
            "libraries": [
                { "name": "a:b:1" },
                { "name": "a:c:1", "rules": [{ "action": "disallow", "os": { "name": "windows" } }] }
            ]
        }));
        let windows = windows_excluded.applicable_libraries(&RuleContext::new("windows", "x86_64"));
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].name, "a:b:1");
        assert_eq!(
            windows_excluded
                .applicable_libraries(&RuleContext::new("linux", "x86_64"))
                .len(),
            2
        );
    }

    #[test]
    fn arguments_are_filtered_by_context() {
        let manifest = parse(&sample());
        let ctx = RuleContext::new("linux", "x86_64");
        assert_eq!(
            manifest.game_arguments(&ctx),
            vec!["--username", "${auth_player_name}"]
        );
        assert_eq!(
            manifest.jvm_arguments(&ctx),
            vec!["-Xss1M", "-cp", "${classpath}"]
        );

        let custom = ctx.with_features(FeatureSet {
            has_custom_resolution: true,
            ..Default::default()
        });
        assert_eq!(
            manifest.game_arguments(&custom),
            vec![
                "--username",
                "${auth_player_name}",
                "--width",
                "${resolution_width}"
            ]
        );
    }

    #[test]
    fn platform_gated_arguments_need_a_matching_rule() {
        let manifest = parse(&serde_json::json!({
            "id": "gated",
            "arguments": {
                "game": [
                    { "rules": [{ "action": "allow", "features": { "is_demo_user": true } }], "value": "--demo" }
                ],
                "jvm": [
                    { "rules": [{ "action": "allow", "os": { "name": "osx" } }], "value": ["-XstartOnFirstThread"] },
                    { "rules": [], "value": "-Dunconditional=true" }
                ]
            }
        }));

        let linux = RuleContext::new("linux", "x86_64");
        assert!(manifest.game_arguments(&linux).is_empty());
        assert_eq!(manifest.jvm_arguments(&linux), vec!["-Dunconditional=true"]);

        let osx = RuleContext::new("osx", "aarch64");
        assert_eq!(
            manifest.jvm_arguments(&osx),
            vec!["-XstartOnFirstThread", "-Dunconditional=true"]
        );

        let demo = linux.with_features(FeatureSet {
            is_demo_user: true,
            ..Default::default()
        });
        assert_eq!(manifest.game_arguments(&demo), vec!["--demo"]);
    }

    #[test]
    fn empty_rule_list_survives_re_serialization() {
        let input = serde_json::json!({
            "id": "x",
            "libraries": [{ "name": "a:b:1", "rules": [] }]
        });
        let output = serde_json::to_value(parse(&input)).unwrap();
        assert_subset(&input, &output, "$");
    }

    #[test]
    fn legacy_minecraft_arguments_are_split() {
        let manifest = parse(&serde_json::json!({
            "id": "1.8.9",
            "minecraftArguments": "--username ${auth_player_name} --version ${version_name}"
        }));
        let ctx = RuleContext::new("linux", "aarch64");
        assert_eq!(manifest.game_arguments(&ctx).len(), 4);
        assert!(manifest.jvm_arguments(&ctx).is_empty());
    }

    #[test]
    fn missing_fields_default() {
        let manifest = parse(&serde_json::json!({ "id": "bare" }));
        assert!(manifest.libraries.is_empty());
        assert!(manifest.asset_index.is_none());
        assert_eq!(manifest.compliance_level, 0);
        assert_eq!(manifest.assets, "");
        assert!(manifest.client_download().is_none());
    }

    #[test]
    fn array_root_is_rejected() {
        let err = parse_game_manifest(br#"["1.20.4"]"#).unwrap_err();
        assert!(matches!(err, ParseError::Json { .. }));
    }

    #[test]
    fn missing_id_is_rejected() {
        let err = parse_game_manifest(br#"{"mainClass": "a.B"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Json { .. }));
    }

    #[test]
    fn library_name_is_required() {
        let err = parse_game_manifest(br#"{"id": "x", "libraries": [{"url": "https://a"}]}"#)
            .unwrap_err();
        match err {
            ParseError::Json { path, .. } => assert!(path.starts_with("libraries[0]")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn artifact_path_falls_back_to_maven_layout() {
        let lib = Library {
            name: "net.fabricmc:sponge-mixin:0.12.5+mixin.0.8.5".into(),
            url: Some("https://maven.fabricmc.net/".into()),
            ..Default::default()
        };
        assert_eq!(
            lib.artifact_path().unwrap(),
            "net/fabricmc/sponge-mixin/0.12.5+mixin.0.8.5/sponge-mixin-0.12.5+mixin.0.8.5.jar"
        );

        assert_eq!(
            lib.download_url().unwrap(),
            "https://maven.fabricmc.net/net/fabricmc/sponge-mixin/0.12.5+mixin.0.8.5/sponge-mixin-0.12.5+mixin.0.8.5.jar"
        );

        let manifest = parse(&sample());
        assert_eq!(
            manifest.libraries[0].artifact_path().unwrap(),
            "com/mojang/blocklist/1.0.10/blocklist-1.0.10.jar"
        );
        assert!(manifest.libraries[0]
            .download_url()
            .unwrap()
            .starts_with("https://libraries.minecraft.net/com/mojang/blocklist"));
    }

    #[test]
    fn native_classifier_substitutes_arch() {
        let lib: Library = serde_json::from_value(serde_json::json!({
            "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4",
            "natives": { "linux": "natives-linux", "windows": "natives-windows-${arch}" },
            "downloads": {
                "classifiers": {
                    "natives-windows-64": {
                        "path": "org/lwjgl/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-windows-64.jar",
                        "sha1": "0000000000000000000000000000000000000000",
                        "size": 10,
                        "url": "https://libraries.minecraft.net/x.jar"
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(
            lib.native_classifier("windows", true).as_deref(),
            Some("natives-windows-64")
        );
        assert!(lib.native_artifact("windows", true).is_some());
        assert!(lib.native_artifact("linux", true).is_none());
        assert_eq!(lib.native_classifier("osx", true), None);
    }
}
