//! Loader preamble: the text that opens the native library before any
//! generated declaration runs.
//!
//! Templates support `${library}`, `${lib_windows}`, `${lib_linux}`,
//! `${lib_macos}` and `${handle}` substitution.

use crate::config::LibraryConfig;

/// Built-in loader: picks the per-platform library file next to the module
/// and binds it to the handle name.
pub const DEFAULT_TEMPLATE: &str = r#"# -*- coding: utf-8 -*-
#
# Generated by ctbind from an annotated C header.
# Edit the header and regenerate; changes made here are lost.

import os
import sys
from ctypes import (
    CDLL,
    CFUNCTYPE,
    POINTER,
    Structure,
    c_bool,
    c_byte,
    c_char,
    c_char_p,
    c_double,
    c_float,
    c_int,
    c_long,
    c_longdouble,
    c_longlong,
    c_short,
    c_ubyte,
    c_uint,
    c_ulong,
    c_ulonglong,
    c_ushort,
    c_void_p,
)
from enum import IntEnum

_LIBRARY_FILES = {
    'win32': '${lib_windows}',
    'linux': '${lib_linux}',
    'darwin': '${lib_macos}',
}


def _load_library():
    platform = 'linux' if sys.platform.startswith('linux') else sys.platform
    if platform not in _LIBRARY_FILES:
        raise OSError('${library}: unsupported platform ' + sys.platform)
    path = os.path.join(os.path.dirname(os.path.abspath(__file__)), _LIBRARY_FILES[platform])
    path = os.path.normcase(os.path.normpath(path))
    if not os.path.isfile(path):
        raise OSError('${library}: shared library not found at ' + path)
    return CDLL(path)


${handle} = _load_library()
"#;

/// Expand the placeholders of a preamble template.
pub fn expand(template: &str, library: &LibraryConfig, handle: &str) -> String {
    template
        .replace("${library}", &library.name)
        .replace("${lib_windows}", &library.windows)
        .replace("${lib_linux}", &library.linux)
        .replace("${lib_macos}", &library.macos)
        .replace("${handle}", handle)
}
