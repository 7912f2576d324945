use std::env;
use std::path::PathBuf;

const WATCHED: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];
const DEFAULT_TRIPLET: &str = "x64-windows";

fn main() {
    for variable in WATCHED {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    for line in windows_ffmpeg_hints() {
        println!("cargo:warning=framepeek: {line}");
    }
}

/// What to tell a Windows user whose FFmpeg location is not explicit.
/// Empty on other targets or once `FFMPEG_DIR` is set.
fn windows_ffmpeg_hints() -> Vec<String> {
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" || env::var_os("FFMPEG_DIR").is_some() {
        return Vec::new();
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        return vec!["FFMPEG_DIR and VCPKG_ROOT are both unset; FFmpeg headers and libraries may not be found".to_string()];
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| DEFAULT_TRIPLET.to_string());
    let installed: PathBuf = [vcpkg_root.into(), PathBuf::from("installed"), triplet.into()]
        .iter()
        .collect();

    if !installed.is_dir() {
        return vec![format!("{} does not exist; is FFmpeg installed with vcpkg?", installed.display())];
    }

    let mut hints = vec![format!("using vcpkg tree {0}; FFMPEG_DIR={0} pins it", installed.display())];
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        hints.push("VCPKGRS_DYNAMIC is unset, so static vcpkg libraries are expected".to_string());
    }
    hints
}
