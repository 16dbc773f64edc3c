//! Shared helpers for assembling synthetic IPDB images in tests.
//!
//! Tests hand-lay tries, so the builder takes the node count up front:
//! nodes start out pointing at the sentinel on both sides and are filled in
//! with `set_node`, while `add_record` appends to the data segment and
//! returns the pointer value a node record must carry to reach it.

#![allow(dead_code)]

pub struct ImageBuilder {
    fields: Vec<String>,
    languages: Vec<(String, usize)>,
    ip_version: u8,
    nodes: Vec<(u32, u32)>,
    data: Vec<u8>,
}

impl ImageBuilder {
    pub fn new(
        fields: &[&str],
        languages: &[(&str, usize)],
        ip_version: u8,
        node_count: u32,
    ) -> Self {
        Self {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            languages: languages
                .iter()
                .map(|(code, offset)| (code.to_string(), *offset))
                .collect(),
            ip_version,
            nodes: vec![(node_count, node_count); node_count as usize],
            // Leading empty record keeps real pointers above the sentinel.
            data: vec![0, 0],
        }
    }

    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// The "not found" record value
    pub fn sentinel(&self) -> u32 {
        self.node_count()
    }

    pub fn set_node(&mut self, id: u32, left: u32, right: u32) {
        self.nodes[id as usize] = (left, right);
    }

    /// Append a record and return the node-record value that points at it
    pub fn add_record(&mut self, text: &str) -> u32 {
        let pointer = self.node_count() + self.data.len() as u32;
        self.data.extend_from_slice(&(text.len() as u16).to_be_bytes());
        self.data.extend_from_slice(text.as_bytes());
        pointer
    }

    pub fn build(self) -> Vec<u8> {
        let total_size = self.nodes.len() as u64 * 8 + self.data.len() as u64;
        self.build_with_total_size(total_size)
    }

    /// Build with an explicit (possibly wrong) `total_size` declaration
    pub fn build_with_total_size(self, total_size: u64) -> Vec<u8> {
        let languages: Vec<String> = self
            .languages
            .iter()
            .map(|(code, offset)| format!(r#""{}":{}"#, code, offset))
            .collect();
        let fields: Vec<String> = self.fields.iter().map(|f| format!(r#""{}""#, f)).collect();
        let json = format!(
            r#"{{"fields":[{}],"languages":{{{}}},"node_count":{},"total_size":{},"ip_version":{}}}"#,
            fields.join(","),
            languages.join(","),
            self.nodes.len(),
            total_size,
            self.ip_version
        );

        let mut image = Vec::new();
        image.extend_from_slice(&(json.len() as u32).to_be_bytes());
        image.extend_from_slice(json.as_bytes());
        for (left, right) in &self.nodes {
            image.extend_from_slice(&left.to_be_bytes());
            image.extend_from_slice(&right.to_be_bytes());
        }
        image.extend_from_slice(&self.data);
        image
    }
}

/// Wire the fixed 96-bit IPv4-mapped prefix chain into nodes `0..96`.
///
/// Bits 0-79 descend through the zero child, bits 80-95 through the one
/// child; node 96 becomes the IPv4 subtree root.
pub fn wire_v4_prefix_chain(builder: &mut ImageBuilder) {
    let sentinel = builder.sentinel();
    for i in 0..96u32 {
        if i < 80 {
            builder.set_node(i, i + 1, sentinel);
        } else {
            builder.set_node(i, sentinel, i + 1);
        }
    }
}

/// Dual-stack city database used across tests.
///
/// IPv4 side (under the mapped-prefix chain, subtree root = node 96):
/// first address bit 0 resolves to the China record, bits `10` to the US
/// record, bits `11` to the sentinel. Records carry CN values at offset 0
/// and EN values at offset 2.
pub fn city_image() -> Vec<u8> {
    let mut builder = ImageBuilder::new(
        &["country", "city"],
        &[("CN", 0), ("EN", 2)],
        3,
        98,
    );
    wire_v4_prefix_chain(&mut builder);

    let china = builder.add_record("中国\t北京\tChina\tBeijing");
    let us = builder.add_record("美国\t洛杉矶\tUnited States\tLos Angeles");

    let sentinel = builder.sentinel();
    builder.set_node(96, china, 97);
    builder.set_node(97, us, sentinel);
    builder.build()
}

/// IPv6 database deep enough to exercise the 16-bit prefix cache: sixteen
/// zero bits reach node 16, whose zero child is the single record.
pub fn v6_deep_image() -> Vec<u8> {
    let mut builder = ImageBuilder::new(&["country"], &[("CN", 0)], 2, 17);
    let sentinel = builder.sentinel();
    for i in 0..16u32 {
        builder.set_node(i, i + 1, sentinel);
    }
    let record = builder.add_record("China");
    builder.set_node(16, record, sentinel);
    builder.build()
}
