//! Shared-library document engine adapter.
//!
//! Loads the engine once with `libloading` and binds its C entry points.
//! Every string the engine returns is owned by the engine's allocator and
//! is wrapped in [`NativeString`], which hands it back through
//! `free_c_string` exactly once when dropped.

use super::DocumentEngine;
use crate::domain::request::ResolvedSignOptions;
use crate::infra::error::{SigningError, SigningResult};
use libloading::Library;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::{c_char, c_double, c_int};
use std::path::{Path, PathBuf};

type CalculateDigestFn = unsafe extern "C" fn(
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    c_int,
    c_int,
    c_int,
    c_int,
    c_double,
    c_double,
    c_double,
    c_double,
    c_int,
) -> *mut c_char;
type RevocationParametersFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;
type EmbedCmsFn = unsafe extern "C" fn(*const c_char, *const c_char, *const c_char) -> c_int;
type FreeCStringFn = unsafe extern "C" fn(*mut c_char);
type VerifyFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;

/// Platform subdirectory and file extension for the current target.
fn platform_layout(os: &str, arch: &str) -> Option<(&'static str, &'static str)> {
    match (os, arch) {
        ("macos", "x86_64") => Some(("macos_x86_64", "dylib")),
        ("macos", "aarch64") => Some(("macos_arm64", "dylib")),
        ("linux", "x86_64") => Some(("linux_x86_64", "so")),
        ("linux", "x86") => Some(("linux_x86", "so")),
        ("linux", "aarch64") => Some(("linux_arm64", "so")),
        ("linux", "arm") => Some(("linux_armv7", "so")),
        ("windows", "x86_64" | "aarch64") => Some(("win64", "dll")),
        ("windows", "x86") => Some(("win32", "dll")),
        _ => None,
    }
}

/// Resolve `<lib_dir>/<platform>/lib<stem>.<ext>` for the running platform.
///
/// # Errors
///
/// Returns error if the platform has no engine build.
pub fn library_path(lib_dir: impl AsRef<Path>, stem: &str) -> SigningResult<PathBuf> {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    let (dir, ext) = platform_layout(os, arch).ok_or_else(|| {
        SigningError::EngineLoadError(format!("Unsupported platform: {os} {arch}"))
    })?;
    Ok(lib_dir.as_ref().join(dir).join(format!("lib{stem}.{ext}")))
}

fn to_cstring(label: &str, value: &str) -> SigningResult<CString> {
    CString::new(value)
        .map_err(|_| SigningError::InvalidInput(format!("{label} contains a NUL byte")))
}

/// Engine-allocated C string, released through `free_c_string` on drop.
struct NativeString<'a> {
    ptr: *mut c_char,
    free: FreeCStringFn,
    _engine: PhantomData<&'a NativeEngine>,
}

impl<'a> NativeString<'a> {
    /// Take ownership of `ptr`; null yields `None`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a NUL-terminated string allocated by the engine
    /// that has not been freed yet.
    unsafe fn from_raw(_engine: &'a NativeEngine, ptr: *mut c_char, free: FreeCStringFn) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self {
                ptr,
                free,
                _engine: PhantomData,
            })
        }
    }

    fn to_string_lossy(&self) -> String {
        // SAFETY: non-null and NUL-terminated per `from_raw`, alive until drop.
        unsafe { CStr::from_ptr(self.ptr) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for NativeString<'_> {
    fn drop(&mut self) {
        // SAFETY: pointer came from the engine and is released only here.
        unsafe { (self.free)(self.ptr) };
    }
}

/// Document engine backed by a dynamically loaded shared library.
///
/// The library stays loaded for the lifetime of this value and is unloaded
/// when it is dropped. Share one instance across workflows (e.g. in an `Arc`).
pub struct NativeEngine {
    path: PathBuf,
    calculate_digest: CalculateDigestFn,
    revocation_parameters: RevocationParametersFn,
    embed_cms: EmbedCmsFn,
    free_c_string: FreeCStringFn,
    verify: Option<VerifyFn>,
    // Declared last: the function pointers above are only valid while it is loaded.
    _library: Library,
}

impl NativeEngine {
    /// Load the engine for the current platform from `lib_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the platform is unsupported, the library cannot be
    /// opened or a required symbol is missing.
    pub fn load_from_dir(lib_dir: impl AsRef<Path>, stem: &str) -> SigningResult<Self> {
        let path = library_path(lib_dir, stem)?;
        Self::load(&path)
    }

    /// Load the engine from an explicit library path.
    ///
    /// # Errors
    ///
    /// Returns error if the library cannot be opened or a required symbol is missing.
    pub fn load(path: &Path) -> SigningResult<Self> {
        log::info!("Loading document engine from {}", path.display());
        // SAFETY: loading runs the library's initializers; the engine is trusted code.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            SigningError::EngineLoadError(format!("Failed to open {}: {e}", path.display()))
        })?;

        // SAFETY: symbol types match the engine's C header. Pointers are copied
        // out of their `Symbol` wrappers and kept next to `library`.
        let (calculate_digest, revocation_parameters, embed_cms, free_c_string, verify) = unsafe {
            let calculate_digest = *library.get::<CalculateDigestFn>(b"calculate_digest\0")?;
            let revocation_parameters =
                *library.get::<RevocationParametersFn>(b"get_revocation_parameters\0")?;
            let embed_cms = *library.get::<EmbedCmsFn>(b"embed_cms\0")?;
            let free_c_string = *library.get::<FreeCStringFn>(b"free_c_string\0")?;
            let verify = library.get::<VerifyFn>(b"verify\0").ok().map(|s| *s);
            (calculate_digest, revocation_parameters, embed_cms, free_c_string, verify)
        };

        if verify.is_none() {
            log::debug!("Engine at {} has no verify entry point", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            calculate_digest,
            revocation_parameters,
            embed_cms,
            free_c_string,
            verify,
            _library: library,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn supports_verify(&self) -> bool {
        self.verify.is_some()
    }

    fn take_string(&self, ptr: *mut c_char) -> Option<String> {
        // SAFETY: `ptr` was just returned by one of this engine's entry points.
        unsafe { NativeString::from_raw(self, ptr, self.free_c_string) }
            .map(|s| s.to_string_lossy())
    }
}

impl DocumentEngine for NativeEngine {
    fn calculate_digest(
        &self,
        input_path: &str,
        options: &ResolvedSignOptions,
    ) -> SigningResult<Option<String>> {
        let input = to_cstring("input path", input_path)?;
        let image = to_cstring("image path", &options.image_path)?;
        let url = to_cstring("url", &options.url)?;
        let location = to_cstring("location", &options.location)?;
        let reason = to_cstring("reason", &options.reason)?;
        let contact = to_cstring("contact info", &options.contact_info)?;
        let field_id = to_cstring("field id", &options.field_id)?;
        let character = to_cstring("character", &options.character)?;

        // SAFETY: all pointers reference CStrings alive for the whole call.
        let raw = unsafe {
            (self.calculate_digest)(
                input.as_ptr(),
                image.as_ptr(),
                url.as_ptr(),
                location.as_ptr(),
                reason.as_ptr(),
                contact.as_ptr(),
                field_id.as_ptr(),
                character.as_ptr(),
                options.signature_kind.engine_code(),
                options.page,
                options.field_format.engine_code(),
                options.visibility.engine_code(),
                options.rect.x,
                options.rect.y,
                options.rect.width,
                options.rect.height,
                c_int::from(options.embed_revocation),
            )
        };
        Ok(self.take_string(raw))
    }

    fn revocation_parameters(&self, cms: &str) -> SigningResult<Option<String>> {
        let cms = to_cstring("cms", cms)?;
        // SAFETY: `cms` outlives the call.
        let raw = unsafe { (self.revocation_parameters)(cms.as_ptr()) };
        Ok(self.take_string(raw))
    }

    fn embed_cms(
        &self,
        pre_sign_json: &str,
        revocation_json: &str,
        output_path: &str,
    ) -> SigningResult<i32> {
        let pre_sign = to_cstring("pre-sign package", pre_sign_json)?;
        let revocation = to_cstring("revocation bundle", revocation_json)?;
        let output = to_cstring("output path", output_path)?;
        // SAFETY: all pointers reference CStrings alive for the whole call.
        let status = unsafe { (self.embed_cms)(pre_sign.as_ptr(), revocation.as_ptr(), output.as_ptr()) };
        Ok(status)
    }

    fn verify(&self, input_path: &str) -> SigningResult<Option<String>> {
        let verify = self.verify.ok_or_else(|| {
            SigningError::EngineError("verify is not available in this engine build".to_string())
        })?;
        let input = to_cstring("input path", input_path)?;
        // SAFETY: `input` outlives the call.
        let raw = unsafe { verify(input.as_ptr()) };
        Ok(self.take_string(raw))
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        log::debug!("Unloading document engine {}", self.path.display());
    }
}
