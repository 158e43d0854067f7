//! EC2 XML serialization: converting output records to response bodies.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use tritonshim_ec2_model::EC2_XML_NAMESPACE;
use tritonshim_ec2_model::output::{
    DescribeImagesOutput, DescribeInstanceTypesOutput, DescribeInstancesOutput, Image, Instance,
    InstanceTypeInfo, Reservation,
};
use tritonshim_ec2_model::types::{InstanceState, Tag};

use crate::error::XmlError;

/// Trait for serializing EC2 types to XML.
///
/// Implementors write their content as child elements of the current element.
/// The root element, namespace and `requestId` are written by [`to_xml`].
pub trait Ec2Serialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as a complete EC2 response document.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: Ec2Serialize>(
    root_element: &str,
    request_id: &str,
    value: &T,
) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", EC2_XML_NAMESPACE))
        .write_inner_content(|w| {
            write_text_element(w, "requestId", request_id)?;
            value.serialize_xml(w)
        })?;

    Ok(buf)
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text_element(writer, tag, v)?;
    }
    Ok(())
}

fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> io::Result<()> {
    write_text_element(writer, tag, if value { "true" } else { "false" })
}

/// Write `<tag><item>..</item>...</tag>`, or nothing for an empty list.
fn write_item_set<W: Write, T: Ec2Serialize>(
    writer: &mut Writer<W>,
    tag: &str,
    items: &[T],
) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writer.create_element(tag).write_inner_content(|w| {
        for item in items {
            w.create_element("item")
                .write_inner_content(|w| item.serialize_xml(w))?;
        }
        Ok(())
    })?;
    Ok(())
}

impl Ec2Serialize for Tag {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "key", &self.key)?;
        write_text_element(writer, "value", &self.value)
    }
}

impl Ec2Serialize for InstanceState {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        if let Some(code) = self.code {
            write_text_element(writer, "code", &code.to_string())?;
        }
        write_text_element(writer, "name", self.name)
    }
}

impl Ec2Serialize for Instance {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "instanceId", &self.instance_id)?;
        write_text_element(writer, "imageId", &self.image_id)?;
        writer
            .create_element("instanceState")
            .write_inner_content(|w| self.state.serialize_xml(w))?;
        write_optional_text(
            writer,
            "privateIpAddress",
            self.private_ip_address.as_deref(),
        )?;
        write_text_element(writer, "instanceType", &self.instance_type)?;
        write_text_element(writer, "virtualizationType", self.virtualization_type)?;
        write_item_set(writer, "tagSet", &self.tags)
    }
}

impl Ec2Serialize for Reservation {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "reservationId", &self.reservation_id)?;
        write_text_element(writer, "ownerId", &self.owner_id)?;
        write_item_set(writer, "instancesSet", &self.instances)
    }
}

impl Ec2Serialize for DescribeInstancesOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_item_set(writer, "reservationSet", &self.reservations)
    }
}

impl Ec2Serialize for Image {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "imageId", &self.image_id)?;
        write_text_element(writer, "imageState", self.state.as_str())?;
        write_text_element(writer, "imageOwnerId", &self.owner_id)?;
        write_bool(writer, "isPublic", self.is_public)?;
        write_text_element(writer, "name", &self.name)?;
        write_optional_text(writer, "description", self.description.as_deref())?;
        write_text_element(writer, "imageType", &self.image_type)?;
        write_optional_text(writer, "creationDate", self.creation_date.as_deref())?;
        write_item_set(writer, "tagSet", &self.tags)
    }
}

impl Ec2Serialize for DescribeImagesOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_item_set(writer, "imagesSet", &self.images)
    }
}

impl Ec2Serialize for InstanceTypeInfo {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "instanceType", &self.instance_type)?;
        writer.create_element("memoryInfo").write_inner_content(|w| {
            write_text_element(w, "sizeInMiB", &self.memory_size_in_mib.to_string())
        })?;
        if let Some(vcpus) = self.default_vcpus {
            writer.create_element("vCpuInfo").write_inner_content(|w| {
                write_text_element(w, "defaultVCpus", &vcpus.to_string())
            })?;
        }
        if let Some(size) = self.total_storage_in_gb {
            writer
                .create_element("instanceStorageInfo")
                .write_inner_content(|w| {
                    write_text_element(w, "totalSizeInGB", &size.to_string())
                })?;
        }
        Ok(())
    }
}

impl Ec2Serialize for DescribeInstanceTypesOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_item_set(writer, "instanceTypeSet", &self.instance_types)
    }
}
