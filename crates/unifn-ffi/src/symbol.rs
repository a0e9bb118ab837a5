//! Symbol resolution.
//!
//! Finds native functions either in the running process image (libc and
//! anything already linked in) or in an explicitly loaded library.

use libloading::Library;
use std::ffi::c_void;
use std::path::Path;
use unifn_core::{NativePointer, Result, UnifyError};

/// A resolved symbol and the library that must stay loaded while it is used.
pub struct LoadedSymbol {
    pub pointer: NativePointer,
    pub library: Option<Library>,
}

/// Look up `name` in the library at `library`, or in the process image when
/// no library is given.
///
/// # Safety
/// Loading a library runs its initialisers. The returned pointer is unified
/// later under a caller-supplied signature, which must match the symbol.
pub unsafe fn resolve(name: &str, library: Option<&Path>) -> Result<LoadedSymbol> {
    match library {
        Some(path) => unsafe { load_symbol(path, name) },
        None => lookup_default(name).map(|pointer| LoadedSymbol {
            pointer,
            library: None,
        }),
    }
}

unsafe fn load_symbol(path: &Path, name: &str) -> Result<LoadedSymbol> {
    let lib = unsafe { Library::new(path) }.map_err(|e| {
        UnifyError::ffi("load library", format!("{}: {e}", path.display()))
    })?;

    let ptr = unsafe { lib.get::<*const c_void>(name.as_bytes()) }
        .map(|symbol| *symbol)
        .map_err(|e| UnifyError::ffi("symbol", format!("'{name}' in {}: {e}", path.display())))?;

    let pointer = unsafe { NativePointer::from_raw(ptr) }
        .ok_or_else(|| UnifyError::ffi("symbol", format!("'{name}' resolved to null")))?;

    Ok(LoadedSymbol {
        pointer,
        library: Some(lib),
    })
}

/// Look up a symbol already present in the process (libc and friends).
pub fn lookup_default(name: &str) -> Result<NativePointer> {
    let ptr = default_symbol(name)
        .ok_or_else(|| UnifyError::ffi("symbol", format!("'{name}' not found")))?;
    // SAFETY: non-null address of a symbol in a loaded image.
    unsafe { NativePointer::from_raw(ptr) }
        .ok_or_else(|| UnifyError::ffi("symbol", format!("'{name}' resolved to null")))
}

fn default_symbol(name: &str) -> Option<*const c_void> {
    // On Linux/Unix, dlsym with RTLD_DEFAULT searches every loaded object
    #[cfg(unix)]
    {
        let name_cstr = std::ffi::CString::new(name).ok()?;
        let ptr = unsafe { libc::dlsym(libc::RTLD_DEFAULT, name_cstr.as_ptr()) };
        if ptr.is_null() { None } else { Some(ptr as *const c_void) }
    }

    // On Windows, try the common C runtime libraries
    #[cfg(windows)]
    {
        let lib_names = [
            "ucrtbase.dll",
            "msvcrt.dll",
            "api-ms-win-crt-stdio-l1-1-0.dll",
        ];

        for lib_name in &lib_names {
            if let Ok(lib) = unsafe { Library::new(lib_name) } {
                if let Ok(symbol) = unsafe { lib.get::<*const c_void>(name.as_bytes()) } {
                    let ptr = *symbol;
                    // Keep the runtime loaded; it lives as long as the process anyway
                    std::mem::forget(lib);
                    return Some(ptr);
                }
            }
        }
        None
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = name;
        None
    }
}
