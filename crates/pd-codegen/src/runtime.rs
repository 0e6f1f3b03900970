//! The C runtime ABI generated code links against.
//!
//! Source-level builtins are remapped to `__pd_`-prefixed C symbols. The
//! table also records each builtin's C signature, which feeds both the
//! emitted prototypes and `let` type classification.

use crate::types::CType;

pub struct Builtin {
    /// Name as written in Palladium source.
    pub name: &'static str,
    pub c_name: &'static str,
    /// C return type; `"void"` for none.
    pub ret: &'static str,
    pub params: &'static [&'static str],
}

impl Builtin {
    pub fn ret_type(&self) -> CType {
        match self.ret {
            "void" => CType::Void,
            other => CType::Named(other),
        }
    }

    pub fn prototype(&self) -> String {
        format!("{} {}({});", self.ret, self.c_name, self.params.join(", "))
    }
}

macro_rules! builtin {
    ($name:literal => $c_name:literal, $ret:literal, [$($param:literal),*]) => {
        Builtin {
            name: $name,
            c_name: $c_name,
            ret: $ret,
            params: &[$($param),*],
        }
    };
}

pub const BUILTINS: &[Builtin] = &[
    builtin!("print" => "__pd_print", "void", ["const char*"]),
    builtin!("print_int" => "__pd_print_int", "void", ["long long"]),
    builtin!("string_len" => "__pd_string_len", "long long", ["const char*"]),
    builtin!("string_concat" => "__pd_string_concat", "const char*", ["const char*", "const char*"]),
    builtin!("string_char_at" => "__pd_string_char_at", "long long", ["const char*", "long long"]),
    builtin!("string_from_char" => "__pd_string_from_char", "const char*", ["long long"]),
    builtin!("int_to_string" => "__pd_int_to_string", "const char*", ["long long"]),
    builtin!("file_open" => "__pd_file_open", "long long", ["const char*"]),
    builtin!("file_read_all" => "__pd_file_read_all", "const char*", ["long long"]),
    builtin!("file_write" => "__pd_file_write", "int", ["long long", "const char*"]),
    builtin!("file_close" => "__pd_file_close", "int", ["long long"]),
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// C symbol for a call target; non-builtins keep their name.
pub fn c_name(name: &str) -> &str {
    lookup(name).map_or(name, |b| b.c_name)
}

pub const HEADERS: &str = "#include <stdio.h>\n#include <stdlib.h>\n#include <string.h>\n";

/// Prototypes for every runtime symbol, one per line.
pub fn declarations() -> String {
    let mut out = String::new();
    for b in BUILTINS {
        out.push_str(&b.prototype());
        out.push('\n');
    }
    out
}

/// Inline definitions of the whole runtime. File handles are small
/// integers `1..255` indexing a static table; `-1` signals failure.
pub const EMBEDDED: &str = r#"void __pd_print(const char* s) {
    printf("%s\n", s);
}

void __pd_print_int(long long v) {
    printf("%lld\n", v);
}

long long __pd_string_len(const char* s) {
    return (long long)strlen(s);
}

const char* __pd_string_concat(const char* a, const char* b) {
    size_t la = strlen(a);
    size_t lb = strlen(b);
    char* out = malloc(la + lb + 1);
    if (!out) return "";
    memcpy(out, a, la);
    memcpy(out + la, b, lb + 1);
    return out;
}

long long __pd_string_char_at(const char* s, long long i) {
    if (i < 0 || i >= (long long)strlen(s)) return -1;
    return (unsigned char)s[i];
}

const char* __pd_string_from_char(long long c) {
    char* out = malloc(2);
    if (!out) return "";
    out[0] = (char)c;
    out[1] = '\0';
    return out;
}

const char* __pd_int_to_string(long long n) {
    char* out = malloc(32);
    if (!out) return "";
    snprintf(out, 32, "%lld", n);
    return out;
}

#define PD_MAX_FILES 256
static FILE* __pd_files[PD_MAX_FILES];
static int __pd_next_file = 1;

static FILE* __pd_file_get(long long h) {
    if (h < 1 || h >= PD_MAX_FILES) return NULL;
    return __pd_files[h];
}

long long __pd_file_open(const char* path) {
    if (__pd_next_file >= PD_MAX_FILES) return -1;
    FILE* f = fopen(path, "r+");
    if (!f) f = fopen(path, "w+");
    if (!f) return -1;
    __pd_files[__pd_next_file] = f;
    return __pd_next_file++;
}

const char* __pd_file_read_all(long long h) {
    FILE* f = __pd_file_get(h);
    if (!f) return "";
    fseek(f, 0, SEEK_END);
    long size = ftell(f);
    fseek(f, 0, SEEK_SET);
    if (size < 0) return "";
    char* out = malloc((size_t)size + 1);
    if (!out) return "";
    size_t got = fread(out, 1, (size_t)size, f);
    out[got] = '\0';
    return out;
}

int __pd_file_write(long long h, const char* s) {
    FILE* f = __pd_file_get(h);
    if (!f) return 0;
    return fputs(s, f) >= 0;
}

int __pd_file_close(long long h) {
    FILE* f = __pd_file_get(h);
    if (!f) return 0;
    __pd_files[h] = NULL;
    return fclose(f) == 0;
}
"#;
