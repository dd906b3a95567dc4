use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

pub const GTF: &str = "\
#!genome-build GRCh38
chr7\tHAVANA\tgene\t1000\t9300\t.\t+\t.\tgene_id \"ENSG1\"; gene_name \"GENE1\";
chr7\tHAVANA\ttranscript\t1000\t5100\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"T1\"; gene_name \"GENE1\"; transcript_name \"GENE1-201\"; transcript_biotype \"protein_coding\";
chr7\tHAVANA\texon\t1000\t1200\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"T1\"; gene_name \"GENE1\"; transcript_name \"GENE1-201\"; transcript_biotype \"protein_coding\";
chr7\tHAVANA\tCDS\t1100\t1200\t.\t+\t0\tgene_id \"ENSG1\"; transcript_id \"T1\"; gene_name \"GENE1\"; transcript_name \"GENE1-201\"; transcript_biotype \"protein_coding\";
chr7\tHAVANA\texon\t5000\t5100\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"T1\"; gene_name \"GENE1\"; transcript_name \"GENE1-201\"; transcript_biotype \"protein_coding\";
chr7\tHAVANA\tCDS\t5000\t5050\t.\t+\t2\tgene_id \"ENSG1\"; transcript_id \"T1\"; gene_name \"GENE1\"; transcript_name \"GENE1-201\"; transcript_biotype \"protein_coding\";
chr7\tHAVANA\texon\t1000\t1200\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"T2\"; gene_name \"GENE1\"; transcript_name \"GENE1-202\"; transcript_biotype \"retained_intron\";
chr7\tHAVANA\texon\t9000\t9300\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"T2\"; gene_name \"GENE1\"; transcript_name \"GENE1-202\"; transcript_biotype \"retained_intron\";
chr9\tHAVANA\texon\t500\t800\t.\t-\t.\tgene_id \"ENSG2\"; transcript_id \"T9\"; gene_name \"GENE2\"; transcript_name \"GENE2-201\";
";

pub const EXPRESSION: &str = "\
transcript_id\tgene_id\ts1\ts2\ts3
T1\tENSG1\t10\t20\t0
T2\tENSG1\t100\t50\t30
T9\tENSG2\t1\t1\t1
";

pub const METADATA: &str = "\
sample_id,condition,age
s1,ctrl,40
s2,treated,52
s3,treated,61
";

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "genes.gtf", GTF);
        write(dir.path(), "counts.tsv", EXPRESSION);
        write(dir.path(), "samples.csv", METADATA);
        Self { dir }
    }

    pub fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}
