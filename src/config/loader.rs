//! 配置加载 - 两层文件发现、解析策略、分层合并
//!
//! 全局层在 `$OPENCODE_CONFIG_DIR`（缺省 `~/.config/opencode`），项目层
//! 从项目目录向上找 `.opencode` 目录。每层找 `beep.jsonc`，其次
//! `beep.json`。文件不存在不是错误也不记日志；读取或解析失败记
//! warning 并对该层回退默认值。
//!
//! 解析策略在启动时选定：编译了 `jsonc` feature 时用容忍注释/尾逗号的
//! 解析器，严格 JSON 解析器始终可用并作为兜底。

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use super::merge::{merge_config, normalize_config};
use super::model::BeepConfig;
use super::raw::RawConfig;

/// 配置文件名，按优先级排列
const CONFIG_FILE_NAMES: [&str; 2] = ["beep.jsonc", "beep.json"];

/// 全局配置目录的环境变量
pub const CONFIG_DIR_ENV: &str = "OPENCODE_CONFIG_DIR";

/// 解析策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigParser {
    /// 容忍注释和尾逗号（`jsonc` feature）
    #[cfg(feature = "jsonc")]
    Tolerant,
    /// 严格 JSON
    Strict,
}

impl ConfigParser {
    /// 启动时按编译能力选定解析器
    pub fn detect() -> Self {
        #[cfg(feature = "jsonc")]
        return ConfigParser::Tolerant;
        #[cfg(not(feature = "jsonc"))]
        ConfigParser::Strict
    }

    /// 解析一份配置文档，只接受顶层对象
    pub fn parse(&self, raw: &str) -> Option<Value> {
        match self {
            #[cfg(feature = "jsonc")]
            ConfigParser::Tolerant => {
                let tolerant = jsonc_parser::parse_to_serde_value(
                    raw,
                    &jsonc_parser::ParseOptions::default(),
                )
                .ok()
                .flatten()
                .filter(Value::is_object);
                // 容忍解析失败时退回严格解析
                tolerant.or_else(|| parse_strict(raw))
            }
            ConfigParser::Strict => parse_strict(raw),
        }
    }
}

fn parse_strict(raw: &str) -> Option<Value> {
    serde_json::from_str::<Value>(raw).ok().filter(Value::is_object)
}

/// 目录下的配置文件路径（jsonc 优先）
pub fn config_path_in_dir(dir: &Path) -> Option<PathBuf> {
    for name in CONFIG_FILE_NAMES {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// 全局配置目录
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join(".config").join("opencode"))
}

/// 从起始目录向上找 `.opencode` 目录
pub fn find_opencode_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(".opencode");
        if candidate.is_dir() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// 项目层配置文件路径
///
/// `.opencode` 目录内优先，其次项目根，最后项目目录本身。
pub fn project_config_path(project_dir: &Path) -> Option<PathBuf> {
    if let Some(opencode_dir) = find_opencode_dir(project_dir) {
        if let Some(path) = config_path_in_dir(&opencode_dir) {
            return Some(path);
        }
        if let Some(root) = opencode_dir.parent() {
            if let Some(path) = config_path_in_dir(root) {
                return Some(path);
            }
        }
    }
    config_path_in_dir(project_dir)
}

/// 读取并解析一层配置文件
fn load_config_file(path: &Path, parser: ConfigParser) -> Option<RawConfig> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "beep config read failed, using defaults"
                );
            }
            return None;
        }
    };

    match parser.parse(&raw).as_ref().and_then(RawConfig::from_value) {
        Some(config) => Some(config),
        None => {
            warn!(
                path = %path.display(),
                "beep config parse failed, using defaults"
            );
            None
        }
    }
}

/// 加载结果：归一化配置 + 实际参与合并的文件路径
#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    pub config: BeepConfig,
    pub global_path: Option<PathBuf>,
    pub project_path: Option<PathBuf>,
}

impl ConfigLoadResult {
    /// 供 `abeep config` 输出的 JSON 摘要
    pub fn to_json(&self) -> Value {
        let mut paths = BTreeMap::new();
        paths.insert("global", path_json(&self.global_path));
        paths.insert("project", path_json(&self.project_path));
        serde_json::json!({
            "config": self.config,
            "paths": paths,
        })
    }
}

fn path_json(path: &Option<PathBuf>) -> Value {
    match path {
        Some(p) => Value::String(p.display().to_string()),
        None => Value::Null,
    }
}

/// 分层加载：默认值 ← 全局 ← 项目，最后归一化
///
/// 目录参数显式传入，便于测试；环境相关的入口见 [`load`]。
pub fn load_layered(global_dir: Option<&Path>, project_dir: Option<&Path>) -> ConfigLoadResult {
    let parser = ConfigParser::detect();
    let mut config = BeepConfig::default();

    let global_path = global_dir.and_then(config_path_in_dir);
    let project_path = project_dir.and_then(project_config_path);

    if let Some(path) = &global_path {
        if let Some(raw) = load_config_file(path, parser) {
            config = merge_config(&config, &raw);
        }
    }
    if let Some(path) = &project_path {
        if let Some(raw) = load_config_file(path, parser) {
            config = merge_config(&config, &raw);
        }
    }

    ConfigLoadResult {
        config: normalize_config(&config),
        global_path,
        project_path,
    }
}

/// 进程入口使用的加载器：全局目录来自环境，项目目录缺省为当前目录
pub fn load(project_dir: Option<&Path>) -> ConfigLoadResult {
    let global_dir = global_config_dir();
    let cwd = std::env::current_dir().ok();
    let project_dir = project_dir
        .map(Path::to_path_buf)
        .or(cwd);
    load_layered(global_dir.as_deref(), project_dir.as_deref())
}
