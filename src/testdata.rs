//! Dump fragments shared by the unit tests.

pub const SAMPLE: &[u8] = b"
/*!40000 ALTER TABLE `geo_tags` DISABLE KEYS */;
INSERT INTO `geo_tags` VALUES (56,18518224,'earth',1,44.34099960,8.55650043,NULL,NULL,NULL,NULL,NULL),(1509,17171704,'earth',1,0.00000000,0.00000000,NULL,NULL,NULL,NULL,NULL);
INSERT INTO `geo_tags` VALUES (158915664,42805125,'earth',1,53.14299194,9.88410444,NULL,NULL,NULL,NULL,NULL);
/*!40000 ALTER TABLE `geo_tags` ENABLE KEYS */;
";

/// Builds a dump with one `INSERT` per chunk of `rows`.
pub fn dump(rows: &[(f64, f64)], per_insert: usize) -> String {
    let mut out = String::from("-- MySQL dump\nCREATE TABLE `geo_tags` (\n  `gt_id` int(10) unsigned NOT NULL\n);\n");
    for (chunk_no, chunk) in rows.chunks(per_insert.max(1)).enumerate() {
        out.push_str("INSERT INTO `geo_tags` VALUES ");
        let tuples: Vec<_> = chunk
            .iter()
            .enumerate()
            .map(|(i, (lat, lon))| {
                format!("({},{},'earth',1,{lat:.8},{lon:.8},NULL,NULL,'',NULL,NULL)", chunk_no, i)
            })
            .collect();
        out.push_str(&tuples.join(","));
        out.push_str(";\n");
    }
    out
}
