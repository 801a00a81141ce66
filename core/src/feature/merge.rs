use super::{FeatureId, FeatureTree};

/// 将 `leaf_name` 在分类树中的祖先链嫁接到 `dest`，并在末端挂上 `tag`
///
/// 找不到叶子或两棵树根节点名称不一致时静默返回 `None`，不修改 `dest`。
/// 根节点名称的一致性由 `ScanSession` 在运行开始时统一检查并报错。
pub fn merge(
    taxonomy: &FeatureTree,
    dest: &mut FeatureTree,
    leaf_name: &str,
    tag: &str,
) -> Option<FeatureId> {
    let leaf = taxonomy.dfs(leaf_name)?;
    let chain = taxonomy.path_from_root(leaf);
    let (root, rest) = chain.split_first()?;

    if taxonomy.name(*root) != dest.root_name() {
        return None;
    }

    let path: Vec<&str> = rest.iter().map(|id| taxonomy.name(*id)).collect();
    Some(graft(dest, &path, tag))
}

/// 沿名称路径逐层复用或创建节点，最后在末端挂上 `tag`
///
/// 路径不含根节点。重复嫁接同一路径不会产生重复的中间节点。
pub fn graft<S: AsRef<str>>(dest: &mut FeatureTree, path: &[S], tag: &str) -> FeatureId {
    let mut cursor = dest.root();
    for name in path {
        cursor = dest.get_or_add_child(cursor, name.as_ref());
    }
    dest.get_or_add_child(cursor, tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> FeatureTree {
        let mut tree = FeatureTree::new("Security");
        let crypto = tree.get_or_add_child(tree.root(), "Crypto");
        tree.get_or_add_child(crypto, "Hashing");
        tree.get_or_add_child(crypto, "Encryption");
        let auth = tree.get_or_add_child(tree.root(), "Authentication");
        tree.get_or_add_child(auth, "Password");
        tree
    }

    #[test]
    fn merge_creates_ancestor_chain_once() {
        let taxo = taxonomy();
        let mut fm = FeatureTree::new("Security");

        let first = merge(&taxo, &mut fm, "Hashing", "API_Hashing_digest").unwrap();
        assert_eq!(fm.len(), 4);
        let second = merge(&taxo, &mut fm, "Hashing", "API_Hashing_update").unwrap();
        assert_eq!(fm.len(), 5);
        assert_eq!(fm.parent(first), fm.parent(second));

        let crypto = fm.find_child(fm.root(), "Crypto").unwrap();
        assert_eq!(fm.children(crypto).len(), 1);
        let hashing = fm.find_child(crypto, "Hashing").unwrap();
        let tags: Vec<&str> = fm.children(hashing).iter().map(|id| fm.name(*id)).collect();
        assert_eq!(tags, vec!["API_Hashing_digest", "API_Hashing_update"]);
    }

    #[test]
    fn merge_of_same_tag_is_idempotent() {
        let taxo = taxonomy();
        let mut fm = FeatureTree::new("Security");
        let a = merge(&taxo, &mut fm, "Password", "API_Password_check");
        let b = merge(&taxo, &mut fm, "Password", "API_Password_check");
        assert_eq!(a, b);
        assert_eq!(fm.len(), 4);
    }

    #[test]
    fn unknown_leaf_is_ignored() {
        let taxo = taxonomy();
        let mut fm = FeatureTree::new("Security");
        assert!(merge(&taxo, &mut fm, "Sandboxing", "API_Sandboxing_run").is_none());
        assert_eq!(fm.len(), 1);
    }

    #[test]
    fn root_mismatch_is_ignored() {
        let taxo = taxonomy();
        let mut fm = FeatureTree::new("Other");
        assert!(merge(&taxo, &mut fm, "Hashing", "API_Hashing_digest").is_none());
        assert_eq!(fm.len(), 1);
    }

    #[test]
    fn merge_on_interior_node_attaches_tag_there() {
        let taxo = taxonomy();
        let mut fm = FeatureTree::new("Security");
        let tag = merge(&taxo, &mut fm, "Crypto", "API_Crypto_init").unwrap();
        assert_eq!(fm.name(fm.parent(tag).unwrap()), "Crypto");
    }

    #[test]
    fn graft_reuses_path_nodes() {
        let mut fm = FeatureTree::new("Security");
        graft(&mut fm, &["Crypto", "Hashing"], "KeywordMatch_1_Hashing");
        graft(&mut fm, &["Crypto", "Hashing"], "KeywordMatch_2_Hashing");
        graft(&mut fm, &["Crypto", "Encryption"], "KeywordMatch_3_Encryption");
        assert_eq!(fm.len(), 7);
        let crypto = fm.find_child(fm.root(), "Crypto").unwrap();
        assert_eq!(fm.children(crypto).len(), 2);
    }
}
