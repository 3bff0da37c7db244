//! Document scope declarations for ShaderLab sources
//!
//! Mirrors the regions a highlighter cares about: block and line comments,
//! quoted strings, brace blocks (Shader/Properties/SubShader/Pass bodies all
//! share one declaration) and `CGPROGRAM .. ENDCG` regions. Comments are
//! declared before strings and strings before blocks, so the earlier kind
//! wins when two regions could open at the same offset.

use once_cell::sync::Lazy;

use shaderlab_grammar::grammar::scoping::{Scope, ScopeDeclareSet, ScopeId};

/// The built-in ShaderLab scope tree
pub struct ShaderScopes {
    set: ScopeDeclareSet,
    root: ScopeId,
}

impl ShaderScopes {
    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn set(&self) -> &ScopeDeclareSet {
        &self.set
    }

    /// Run `f` with the declaration set and root id; convenience for
    /// matching without borrowing fields separately.
    pub fn with_set<T>(&self, f: impl FnOnce(&ScopeDeclareSet, ScopeId) -> T) -> T {
        f(&self.set, self.root)
    }

    /// The declared name of the declaration that produced `scope`.
    pub fn name_of(&self, scope: &Scope) -> &str {
        self.set.get(scope.declare).name()
    }
}

pub static SHADERLAB_SCOPES: Lazy<ShaderScopes> = Lazy::new(build_shaderlab_scopes);

fn build_shaderlab_scopes() -> ShaderScopes {
    let mut set = ScopeDeclareSet::new();

    let block_comment = set
        .declare_delimited(Some("comment.block"), Some(r"/\*"), Some(r"\*/"))
        .expect("static scope pattern");
    let line_comment = set
        .declare_delimited(Some("comment.line"), Some("//"), Some(r"\r?\n"))
        .expect("static scope pattern");
    let string = set
        .declare_delimited(Some("string.quoted"), Some("\""), Some("\""))
        .expect("static scope pattern");
    let cg_program = set
        .declare_delimited(Some("source.cg"), Some("CGPROGRAM"), Some("ENDCG"))
        .expect("static scope pattern");
    let block = set
        .declare_delimited(Some("meta.block"), Some(r"\{"), Some(r"\}"))
        .expect("static scope pattern");

    // comments shadow strings, strings shadow blocks
    for child in [block_comment, line_comment, string, cg_program, block] {
        set.add_child(block, child);
    }
    for child in [block_comment, line_comment, string] {
        set.add_child(cg_program, child);
    }

    let root = set.declare(Some("source.shaderlab"), None, None);
    for child in [block_comment, line_comment, string, cg_program, block] {
        set.add_child(root, child);
    }

    ShaderScopes { set, root }
}
