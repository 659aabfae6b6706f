//! Synthetic NetCDF classic files and predictable value patterns.
//!
//! [`NcFileBuilder`] writes real classic-format bytes (header plus data
//! section) so that parser and pipeline tests exercise the same byte layout a
//! server would deliver, and reports where each variable landed.

/// Values of one variable or attribute, in the on-disk type.
#[derive(Debug, Clone, PartialEq)]
pub enum NcValues {
    Byte(Vec<i8>),
    Char(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl NcValues {
    /// Convenience for a text attribute.
    pub fn text(s: &str) -> Self {
        Self::Char(s.as_bytes().to_vec())
    }

    pub fn type_code(&self) -> u32 {
        match self {
            Self::Byte(_) => 1,
            Self::Char(_) => 2,
            Self::Short(_) => 3,
            Self::Int(_) => 4,
            Self::Float(_) => 5,
            Self::Double(_) => 6,
        }
    }

    pub fn element_size(&self) -> usize {
        match self {
            Self::Byte(_) | Self::Char(_) => 1,
            Self::Short(_) => 2,
            Self::Int(_) | Self::Float(_) => 4,
            Self::Double(_) => 8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Byte(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Big-endian encoding of every element, unpadded.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        match self {
            Self::Byte(v) => v.iter().map(|&x| x as u8).collect(),
            Self::Char(v) => v.clone(),
            Self::Short(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
            Self::Int(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
            Self::Float(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
            Self::Double(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
        }
    }
}

/// Where a variable's data was placed in a built file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarLayout {
    pub name: String,
    pub begin: u64,
    pub vsize: u64,
}

/// A complete classic file.
#[derive(Debug, Clone)]
pub struct NcFile {
    pub bytes: Vec<u8>,
    /// Exact length of the header; every shorter prefix is incomplete
    pub header_len: usize,
    pub variables: Vec<VarLayout>,
}

impl NcFile {
    pub fn layout(&self, name: &str) -> &VarLayout {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .unwrap_or_else(|| panic!("no variable '{}' in built file", name))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone)]
struct VarSpec {
    name: String,
    dims: Vec<String>,
    attributes: Vec<(String, NcValues)>,
    values: NcValues,
}

/// Builder for classic (`CDF\x01`) and 64-bit offset (`CDF\x02`) files.
///
/// # Example
///
/// ```
/// use test_utils::{NcFileBuilder, NcValues};
///
/// let file = NcFileBuilder::new()
///     .dimension("x", 2)
///     .dimension("y", 3)
///     .variable("temperature", &["x", "y"], NcValues::Float(vec![0.0; 6]))
///     .build();
/// assert_eq!(file.layout("temperature").vsize, 24);
/// assert_eq!(file.len(), file.header_len + 24);
/// ```
#[derive(Debug, Clone)]
pub struct NcFileBuilder {
    version: u8,
    num_records: Option<u32>,
    streaming: bool,
    dimensions: Vec<(String, u32)>,
    global_attributes: Vec<(String, NcValues)>,
    variables: Vec<VarSpec>,
    data_start: usize,
}

impl Default for NcFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NcFileBuilder {
    pub fn new() -> Self {
        Self {
            version: 1,
            num_records: None,
            streaming: false,
            dimensions: Vec::new(),
            global_attributes: Vec::new(),
            variables: Vec::new(),
            data_start: 0,
        }
    }

    /// Write a 64-bit offset file instead of classic.
    pub fn offset64(mut self) -> Self {
        self.version = 2;
        self
    }

    pub fn dimension(mut self, name: &str, len: u32) -> Self {
        assert!(len > 0, "use record_dimension for the unlimited dimension");
        self.dimensions.push((name.to_string(), len));
        self
    }

    pub fn record_dimension(mut self, name: &str) -> Self {
        self.dimensions.push((name.to_string(), 0));
        self
    }

    /// Override the record count written to the header.
    pub fn num_records(mut self, n: u32) -> Self {
        self.num_records = Some(n);
        self
    }

    /// Write `STREAMING` as the record count.
    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub fn global_attribute(mut self, name: &str, value: NcValues) -> Self {
        self.global_attributes.push((name.to_string(), value));
        self
    }

    pub fn variable(mut self, name: &str, dims: &[&str], values: NcValues) -> Self {
        self.variables.push(VarSpec {
            name: name.to_string(),
            dims: dims.iter().map(|d| d.to_string()).collect(),
            attributes: Vec::new(),
            values,
        });
        self
    }

    /// Attach an attribute to the most recently added variable.
    pub fn variable_attribute(mut self, name: &str, value: NcValues) -> Self {
        let var = self
            .variables
            .last_mut()
            .expect("variable_attribute called before variable");
        var.attributes.push((name.to_string(), value));
        self
    }

    /// Start the data section no earlier than `offset` (header free space).
    pub fn data_start(mut self, offset: usize) -> Self {
        self.data_start = offset;
        self
    }

    pub fn build(self) -> NcFile {
        let record_id = self.dimensions.iter().position(|(_, len)| *len == 0);

        let dim_ids: Vec<Vec<usize>> = self
            .variables
            .iter()
            .map(|v| {
                v.dims
                    .iter()
                    .map(|d| {
                        self.dimensions
                            .iter()
                            .position(|(name, _)| name == d)
                            .unwrap_or_else(|| panic!("unknown dimension '{}'", d))
                    })
                    .collect()
            })
            .collect();

        let is_record: Vec<bool> = dim_ids
            .iter()
            .map(|ids| record_id.is_some() && ids.first().copied() == record_id)
            .collect();

        // Elements per variable (or per record for record variables)
        let counts: Vec<usize> = dim_ids
            .iter()
            .zip(&is_record)
            .map(|(ids, &record)| {
                let skip = usize::from(record);
                ids[skip..]
                    .iter()
                    .map(|&id| self.dimensions[id].1 as usize)
                    .product()
            })
            .collect();

        let vsizes: Vec<u64> = self
            .variables
            .iter()
            .zip(&counts)
            .map(|(v, &count)| pad4(count * v.values.element_size()) as u64)
            .collect();

        let num_records = self.num_records.unwrap_or_else(|| {
            let mut n = 0;
            for (i, var) in self.variables.iter().enumerate() {
                if is_record[i] && counts[i] > 0 {
                    n = n.max((var.values.len() / counts[i]) as u32);
                }
            }
            n
        });

        let header_len = self.write_header(&vec![0; self.variables.len()], num_records, &dim_ids).len();
        let data_start = header_len.max(self.data_start);

        let mut begins = vec![0u64; self.variables.len()];
        let mut cursor = data_start as u64;
        for (i, _) in self.variables.iter().enumerate().filter(|(i, _)| !is_record[*i]) {
            begins[i] = cursor;
            cursor += vsizes[i];
        }
        let record_start = cursor;
        for (i, _) in self.variables.iter().enumerate().filter(|(i, _)| is_record[*i]) {
            begins[i] = cursor;
            cursor += vsizes[i];
        }
        let record_step = cursor - record_start;

        let mut bytes = self.write_header(&begins, num_records, &dim_ids);
        bytes.resize(data_start, 0);

        for (i, var) in self.variables.iter().enumerate().filter(|(i, _)| !is_record[*i]) {
            let mut data = var.values.to_be_bytes();
            data.resize(vsizes[i] as usize, 0);
            bytes.extend_from_slice(&data);
        }
        for r in 0..num_records as usize {
            for (i, var) in self.variables.iter().enumerate().filter(|(i, _)| is_record[*i]) {
                let per_record = counts[i] * var.values.element_size();
                let all = var.values.to_be_bytes();
                let mut slice = all
                    .get(r * per_record..(r + 1) * per_record)
                    .map(|s| s.to_vec())
                    .unwrap_or_default();
                slice.resize(vsizes[i] as usize, 0);
                bytes.extend_from_slice(&slice);
            }
        }
        debug_assert_eq!(
            bytes.len() as u64,
            record_start + record_step * num_records as u64
        );

        let variables = self
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| VarLayout {
                name: v.name.clone(),
                begin: begins[i],
                vsize: vsizes[i],
            })
            .collect();

        NcFile {
            bytes,
            header_len,
            variables,
        }
    }

    fn write_header(&self, begins: &[u64], num_records: u32, dim_ids: &[Vec<usize>]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"CDF");
        out.push(self.version);
        let numrecs = if self.streaming { u32::MAX } else { num_records };
        out.extend_from_slice(&numrecs.to_be_bytes());

        write_list_header(&mut out, 0x0A, self.dimensions.len());
        for (name, len) in &self.dimensions {
            write_name(&mut out, name);
            out.extend_from_slice(&len.to_be_bytes());
        }

        write_attributes(&mut out, &self.global_attributes);

        write_list_header(&mut out, 0x0B, self.variables.len());
        for (i, var) in self.variables.iter().enumerate() {
            write_name(&mut out, &var.name);
            out.extend_from_slice(&(dim_ids[i].len() as u32).to_be_bytes());
            for &id in &dim_ids[i] {
                out.extend_from_slice(&(id as u32).to_be_bytes());
            }
            write_attributes(&mut out, &var.attributes);
            out.extend_from_slice(&var.values.type_code().to_be_bytes());
            let count: usize = dim_ids[i]
                .iter()
                .map(|&id| self.dimensions[id].1 as usize)
                .filter(|&len| len > 0)
                .product();
            out.extend_from_slice(&(pad4(count * var.values.element_size()) as u32).to_be_bytes());
            if self.version == 1 {
                out.extend_from_slice(&(begins[i] as u32).to_be_bytes());
            } else {
                out.extend_from_slice(&begins[i].to_be_bytes());
            }
        }

        out
    }
}

fn pad4(n: usize) -> usize {
    (n + 3) & !3
}

fn write_list_header(out: &mut Vec<u8>, tag: u32, count: usize) {
    if count == 0 {
        out.extend_from_slice(&[0; 8]);
    } else {
        out.extend_from_slice(&tag.to_be_bytes());
        out.extend_from_slice(&(count as u32).to_be_bytes());
    }
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    out.extend_from_slice(&(name.len() as u32).to_be_bytes());
    out.extend_from_slice(name.as_bytes());
    out.resize(out.len() + pad4(name.len()) - name.len(), 0);
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(String, NcValues)]) {
    write_list_header(out, 0x0C, attributes.len());
    for (name, value) in attributes {
        write_name(out, name);
        out.extend_from_slice(&value.type_code().to_be_bytes());
        out.extend_from_slice(&(value.len() as u32).to_be_bytes());
        let data = value.to_be_bytes();
        out.extend_from_slice(&data);
        out.resize(out.len() + pad4(data.len()) - data.len(), 0);
    }
}

/// Creates a volume with predictable values.
///
/// Element `i` (row-major, x slowest) has value `i as f32 * step + start`,
/// so min is `start` and max is `start + (n - 1) * step` for positive steps.
pub fn create_ramp_volume(x: usize, y: usize, z: usize, start: f32, step: f32) -> Vec<f32> {
    (0..x * y * z).map(|i| start + i as f32 * step).collect()
}
