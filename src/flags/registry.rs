//! The curated global flag lists and their registration.
//!
//! The lists themselves are compiled-in data shared by every target; keeping
//! them in one variable each (rather than repeating them per compile step)
//! keeps the generated build description small. Order within each list is
//! significant and survives registration unchanged.

use crate::flags::filter::{filter_unsupported, ToolchainCapabilities};
use crate::runtime::{
    RuntimeConfig, SourceTree, ENV_CC_WRAPPER, ENV_CLANG_BASE, ENV_CLANG_VERSION,
};
use crate::vars::{VarContext, VarError};

/// Flags applied to every compile, device or host.
const COMMON_GLOBAL_CFLAGS: &[&str] = &[
    "-DANDROID",
    "-fmessage-length=0",
    "-W",
    "-Wall",
    "-Wno-unused",
    "-Winit-self",
    "-Wpointer-arith",
    "-Wno-address-of-packed-member",
    "-Wno-main",
    "-Wno-instantiation-after-specialization",
    "-Wno-max-unsigned-zero",
    // Make paths in deps files relative
    "-no-canonical-prefixes",
    "-DNDEBUG",
    "-UDEBUG",
    "-fno-exceptions",
    "-Wno-multichar",
    "-O2",
    "-g",
    "-fno-strict-aliasing",
];

const COMMON_GLOBAL_CONLYFLAGS: &[&str] = &[];

const DEVICE_GLOBAL_CFLAGS: &[&str] = &[
    "-fdiagnostics-color",
    "-fno-canonical-system-headers",
    "-ffunction-sections",
    "-funwind-tables",
    "-fstack-protector-strong",
    "-Wa,--noexecstack",
    "-D_FORTIFY_SOURCE=2",
    "-Wstrict-aliasing=2",
    "-Wno-error=return-type",
    "-Wno-error=non-virtual-dtor",
    "-Wno-error=address",
    "-Wno-error=sequence-point",
    "-Wno-error=date-time",
    "-Werror=format-security",
];

const DEVICE_GLOBAL_LDFLAGS: &[&str] = &[
    "-Wl,-z,noexecstack",
    "-Wl,-z,relro",
    "-Wl,-z,now",
    "-Wl,--build-id=md5",
    "-Wl,--warn-shared-textrel",
    "-Wl,--fatal-warnings",
    "-Wl,--no-undefined-version",
];

// Maybe in the future lld will want different global flags.
const DEVICE_GLOBAL_LLDFLAGS: &[&str] = &[
    "-Wl,-z,noexecstack",
    "-Wl,-z,relro",
    "-Wl,-z,now",
    "-Wl,--build-id=md5",
    "-Wl,--warn-shared-textrel",
    "-Wl,--fatal-warnings",
    "-Wl,--no-undefined-version",
];

const HOST_GLOBAL_CFLAGS: &[&str] = &[];

const HOST_GLOBAL_LDFLAGS: &[&str] = &[];

const HOST_GLOBAL_LLDFLAGS: &[&str] = &[];

const COMMON_GLOBAL_CPPFLAGS: &[&str] = &[
    "-Wno-inconsistent-missing-override",
    "-Wsign-promo",
];

const NO_OVERRIDE_GLOBAL_CFLAGS: &[&str] = &[
    "-Wno-error=int-to-pointer-cast",
    "-Wno-error=pointer-to-int-cast",
];

/// Flags modules are never allowed to pass.
pub const ILLEGAL_FLAGS: &[&str] = &["-w"];

/// Default C standard.
pub const C_STD_VERSION: &str = "gnu99";

/// Default C++ standard.
pub const CPP_STD_VERSION: &str = "gnu++14";

/// Include directories shared by legacy modules. Entries that do not exist
/// in the checkout are dropped at registration time.
const COMMON_GLOBAL_INCLUDES: &[&str] = &[
    "system/core/include",
    "system/media/audio/include",
    "hardware/libhardware/include",
    "hardware/libhardware_legacy/include",
    "libnativehelper/include",
    "frameworks/native/include",
    "frameworks/native/opengl/include",
    "frameworks/av/include",
];

/// Where non-NDK modules pick up jni.h. Export-include-dirs cannot help
/// here since there is no associated library.
const NATIVEHELPER_INCLUDES: &[&str] = &["libnativehelper/include_deprecated"];

/// Include directories for RenderScript generated code.
const RS_GLOBAL_INCLUDES: &[&str] = &[
    "external/clang/lib/Headers",
    "frameworks/rs/script_api/include",
];

/// Compiled-in prebuilt clang install root, relative to the source tree.
pub const CLANG_DEFAULT_BASE: &str = "prebuilts/clang/host";

/// Compiled-in prebuilt clang version directory.
pub const CLANG_DEFAULT_VERSION: &str = "6.0";

/// Compiled-in short clang version, used for per-version library paths.
pub const CLANG_DEFAULT_SHORT_VERSION: &str = "6.0";

/// Compiled-in base of the clang prebuilts the RenderScript compiler
/// ships under. Tied to the LLVM checkout, so it may trail the host
/// prebuilts used for the rest of the build.
pub const RS_CLANG_DEFAULT_BASE: &str = "prebuilts/clang/host";

/// Compiled-in RenderScript clang version directory.
pub const RS_CLANG_DEFAULT_VERSION: &str = "6.0";

/// Compiled-in RenderScript release version.
pub const RS_RELEASE_VERSION: &str = "6.0";

/// The common flag list, with the host-conditional entry applied.
///
/// On Linux hosts an extra flag rewrites the debug prefix so object files
/// do not bake in the absolute build directory. This must happen before
/// any list is joined into a variable.
fn common_cflags(host_is_linux: bool) -> Vec<&'static str> {
    let mut flags = COMMON_GLOBAL_CFLAGS.to_vec();
    if host_is_linux {
        flags.push("-fdebug-prefix-map=/proc/self/cwd=");
    }
    flags
}

/// System-header include string for one device architecture pair:
/// `bionic_arch` selects the libc arch headers, `kernel_arch` the uapi
/// headers. Joined with single spaces like every other flag variable.
pub fn bionic_headers(bionic_arch: &str, kernel_arch: &str) -> String {
    [
        format!("-isystem bionic/libc/arch-{bionic_arch}/include"),
        "-isystem bionic/libc/include".to_string(),
        "-isystem bionic/libc/kernel/uapi".to_string(),
        format!("-isystem bionic/libc/kernel/uapi/asm-{kernel_arch}"),
        "-isystem bionic/libc/kernel/android/scsi".to_string(),
        "-isystem bionic/libc/kernel/android/uapi".to_string(),
    ]
    .join(" ")
}

/// Join a filtered flag list and append a `${...}` placeholder for the
/// toolchain-specific extra flags. The placeholder goes after filtering,
/// never before, so the filter can never drop it.
fn joined_with_placeholder(
    flags: &[&str],
    caps: &ToolchainCapabilities,
    placeholder: &str,
) -> String {
    let mut filtered = filter_unsupported(flags, caps);
    filtered.push(placeholder);
    filtered.join(" ")
}

/// Register every global flag and toolchain-path variable.
///
/// Runs once at process start, single-threaded, before anything queries
/// the context. Duplicate names mean two callers fought over the same
/// variable and surface as [`VarError::Duplicate`].
pub fn register_globals(ctx: &mut VarContext, tree: &dyn SourceTree) -> Result<(), VarError> {
    let common = common_cflags(cfg!(target_os = "linux"));
    let caps = ToolchainCapabilities::clang();

    ctx.declare_static("CommonGlobalCflags", common.join(" "))?;
    ctx.declare_static("CommonGlobalConlyflags", COMMON_GLOBAL_CONLYFLAGS.join(" "))?;
    ctx.declare_static("DeviceGlobalCflags", DEVICE_GLOBAL_CFLAGS.join(" "))?;
    ctx.declare_static("DeviceGlobalLdflags", DEVICE_GLOBAL_LDFLAGS.join(" "))?;
    ctx.declare_static("DeviceGlobalLldflags", DEVICE_GLOBAL_LLDFLAGS.join(" "))?;
    ctx.declare_static("HostGlobalCflags", HOST_GLOBAL_CFLAGS.join(" "))?;
    ctx.declare_static("HostGlobalLdflags", HOST_GLOBAL_LDFLAGS.join(" "))?;
    ctx.declare_static("HostGlobalLldflags", HOST_GLOBAL_LLDFLAGS.join(" "))?;
    ctx.declare_static("NoOverrideGlobalCflags", NO_OVERRIDE_GLOBAL_CFLAGS.join(" "))?;
    ctx.declare_static("CommonGlobalCppflags", COMMON_GLOBAL_CPPFLAGS.join(" "))?;

    ctx.declare_static(
        "CommonClangGlobalCflags",
        joined_with_placeholder(&common, &caps, "${ClangExtraCflags}"),
    )?;
    ctx.declare_static(
        "DeviceClangGlobalCflags",
        joined_with_placeholder(DEVICE_GLOBAL_CFLAGS, &caps, "${ClangExtraTargetCflags}"),
    )?;
    ctx.declare_static(
        "HostClangGlobalCflags",
        filter_unsupported(HOST_GLOBAL_CFLAGS, &caps).join(" "),
    )?;
    ctx.declare_static(
        "NoOverrideClangGlobalCflags",
        joined_with_placeholder(NO_OVERRIDE_GLOBAL_CFLAGS, &caps, "${ClangExtraNoOverrideCflags}"),
    )?;
    ctx.declare_static(
        "CommonClangGlobalCppflags",
        joined_with_placeholder(COMMON_GLOBAL_CPPFLAGS, &caps, "${ClangExtraCppflags}"),
    )?;

    ctx.declare_source_path_list("CommonGlobalIncludes", "-I", COMMON_GLOBAL_INCLUDES, tree)?;
    ctx.declare_source_path_list("CommonNativehelperInclude", "-I", NATIVEHELPER_INCLUDES, tree)?;

    ctx.declare_static("ClangDefaultBase", CLANG_DEFAULT_BASE)?;
    ctx.declare_deferred("ClangBase", |config| {
        let override_ = config.getenv(ENV_CLANG_BASE);
        if !override_.is_empty() {
            return Ok(override_);
        }
        Ok("${ClangDefaultBase}".to_string())
    })?;
    ctx.declare_deferred("ClangVersion", |config| {
        let override_ = config.getenv(ENV_CLANG_VERSION);
        if !override_.is_empty() {
            return Ok(override_);
        }
        Ok(CLANG_DEFAULT_VERSION.to_string())
    })?;
    ctx.declare_static("ClangPath", "${ClangBase}/${HostPrebuiltTag}/${ClangVersion}")?;
    ctx.declare_static("ClangBin", "${ClangPath}/bin")?;
    ctx.declare_deferred("ClangShortVersion", |config| {
        let override_ = config.getenv(ENV_CLANG_VERSION);
        if !override_.is_empty() {
            return Ok(override_);
        }
        Ok(CLANG_DEFAULT_SHORT_VERSION.to_string())
    })?;
    ctx.declare_static(
        "ClangAsanLibDir",
        format!("${{ClangPath}}/lib/clang/{CLANG_DEFAULT_SHORT_VERSION}.0/lib/linux"),
    )?;
    ctx.declare_static("LLVMGoldPlugin", "${ClangPath}/lib/LLVMgold.so")?;

    ctx.declare_static("RSClangBase", RS_CLANG_DEFAULT_BASE)?;
    ctx.declare_static("RSClangVersion", RS_CLANG_DEFAULT_VERSION)?;
    ctx.declare_static("RSReleaseVersion", RS_RELEASE_VERSION)?;
    ctx.declare_static(
        "RSLLVMPrebuiltsPath",
        "${RSClangBase}/${HostPrebuiltTag}/${RSClangVersion}/bin",
    )?;
    ctx.declare_static(
        "RSIncludePath",
        format!(
            "${{RSClangBase}}/${{HostPrebuiltTag}}/${{RSClangVersion}}/lib/clang/{RS_RELEASE_VERSION}.0/include"
        ),
    )?;
    ctx.declare_source_path_list("RsGlobalIncludes", "-I", RS_GLOBAL_INCLUDES, tree)?;

    ctx.declare_deferred("CcWrapper", |config| {
        let wrapper = config.getenv(ENV_CC_WRAPPER);
        if !wrapper.is_empty() {
            return Ok(format!("{wrapper} "));
        }
        Ok(String::new())
    })?;

    ctx.declare_config_method("HostPrebuiltTag", |config| config.host_prebuilt_tag())?;

    Ok(())
}
